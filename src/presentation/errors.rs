// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::FormRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::models::document::UnknownDocumentType;
use crate::domain::services::llm_service::LlmError;
use crate::infrastructure::pdf::text_extractor::PdfError;
use crate::presentation::middleware::rate_limit_middleware::RateLimitError;

/// 对外统一的内部错误描述，不暴露提供商细节
pub const INTERNAL_ERROR_DETAIL: &str = "Internal error";

/// 应用错误类型
///
/// 每种错误对应一个固定的 HTTP 状态码，响应体为 `{"detail": "..."}`
#[derive(Error, Debug)]
pub enum AppError {
    /// 输入不合法（400）
    #[error("{0}")]
    BadRequest(String),

    /// 请求体无法被提取器接受，沿用提取器给出的状态码
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    /// 未授权（401）
    #[error("{0}")]
    Unauthorized(&'static str),

    /// 请求过多（429）
    #[error("Too many requests. Wait a minute before trying again.")]
    TooManyRequests { retry_after_secs: u64 },

    /// 内部错误（500），内容只写日志
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Internal(cause) => {
                error!("Request failed: {}", cause);
                INTERNAL_ERROR_DETAIL.to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if let AppError::TooManyRequests { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        tracing::warn!("Unreadable PDF upload: {}", err);
        AppError::BadRequest("Could not read the PDF file.".to_string())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejected {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::TooManyRequests { retry_after } => AppError::TooManyRequests {
                // Round up so clients never retry early
                retry_after_secs: retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0),
            },
        }
    }
}

impl From<UnknownDocumentType> for AppError {
    fn from(err: UnknownDocumentType) -> Self {
        let supported = crate::domain::models::document::DocumentType::supported_keys();
        AppError::BadRequest(format!(
            "Unsupported document type '{}'. Use one of: {:?}",
            err.0, supported
        ))
    }
}
