// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 定义文档类型、置信度标签以及两个处理接口的响应结构
pub mod document;
