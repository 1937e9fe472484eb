// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取服务（extraction_service）：串联模板、模型调用和回复解析
/// - LLM服务（llm_service）：与 LLM 提供商的补全接口交互
/// - 提示模板（prompt_catalog）：按文档类型选择提取指令
/// - 回复解析（response_parser）：去除代码围栏、解析 JSON、推断置信度
pub mod extraction_service;
pub mod llm_service;
pub mod prompt_catalog;
pub mod response_parser;
