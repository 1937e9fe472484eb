// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 每个处理器负责校验输入、调用领域服务并组装响应
pub mod info_handler;
pub mod process_handler;
