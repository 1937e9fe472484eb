// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Json;
use chrono::Utc;
use serde_json::Value;

use crate::application::dto::info_response::{
    HealthResponseDto, ServiceInfoDto, TemplatesResponseDto,
};
use crate::domain::models::document::DocumentType;
use crate::domain::services::prompt_catalog;

const TEMPLATE_PREVIEW_CHARS: usize = 200;

/// 服务信息端点
///
/// GET /
pub async fn root() -> Json<ServiceInfoDto> {
    Json(ServiceInfoDto {
        message: "AI Document Processor API - Active".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_types: DocumentType::supported_keys()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// 健康检查端点
///
/// GET /health
pub async fn health_check() -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// 模板列表端点
///
/// GET /templates
pub async fn templates() -> Json<TemplatesResponseDto> {
    let templates = DocumentType::ALL
        .iter()
        .map(|t| {
            // suffixed even when the template is shorter than the preview
            let head: String = prompt_catalog::template(*t)
                .chars()
                .take(TEMPLATE_PREVIEW_CHARS)
                .collect();
            (t.as_str().to_string(), Value::String(format!("{}...", head)))
        })
        .collect();

    Json(TemplatesResponseDto {
        available_types: DocumentType::supported_keys()
            .into_iter()
            .map(String::from)
            .collect(),
        templates,
    })
}
