// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /` 的服务信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfoDto {
    pub message: String,
    pub version: String,
    pub supported_types: Vec<String>,
}

/// `GET /health` 的存活信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub timestamp: String,
}

/// `GET /templates` 的模板列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesResponseDto {
    pub available_types: Vec<String>,
    /// 类型 -> 模板前 200 个字符，顺序与 `available_types` 一致
    pub templates: Map<String, Value>,
}
