// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：文档类型和提取结果
/// - 服务（services）：提示模板、模型调用、回复解析和提取编排
///
/// 领域层不依赖 HTTP 层，处理器只负责校验输入和组装响应。
pub mod models;
pub mod services;
