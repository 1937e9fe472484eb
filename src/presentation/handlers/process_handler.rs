// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, Form, Multipart,
    },
    Extension, Json,
};
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::dto::process_request::{
    is_long_enough, ProcessTextRequestDto, DEFAULT_DOCUMENT_TYPE,
};
use crate::domain::models::document::{
    text_preview, DocumentType, ProcessResponse, TextProcessResponse,
};
use crate::domain::services::extraction_service::ExtractionService;
use crate::infrastructure::pdf::text_extractor::TextExtractor;
use crate::presentation::errors::AppError;

/// 预览文本的最大字符数
const PREVIEW_CHARS: usize = 500;

struct PdfUpload {
    file_name: String,
    bytes: Vec<u8>,
}

/// 处理 PDF 上传
///
/// POST /process/pdf
///
/// 接受 multipart 表单：
/// - `file`: PDF 文件，文件名必须以 `.pdf` 结尾
/// - `document_type`（可选，默认 `generic`）：必须是已知类型，未知类型直接拒绝
///
/// 提取的文本少于 50 个字符时返回 400
pub async fn process_pdf(
    Extension(extraction): Extension<Arc<ExtractionService>>,
    Extension(text_extractor): Extension<Arc<dyn TextExtractor>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    counter!("docproc_requests_total", "route" => "/process/pdf").increment(1);
    let mut multipart = multipart?;

    let mut upload: Option<PdfUpload> = None;
    let mut document_type = DEFAULT_DOCUMENT_TYPE.to_string();

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                upload = Some(PdfUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "document_type" => {
                document_type = field.text().await?;
            }
            other => debug!("Ignoring unexpected multipart field: {}", other),
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    if !upload.file_name.ends_with(".pdf") {
        return Err(AppError::BadRequest("Only PDF files are accepted".to_string()));
    }
    let document_type: DocumentType = document_type.parse()?;

    let PdfUpload { file_name, bytes } = upload;
    let text = tokio::task::spawn_blocking(move || text_extractor.extract(&bytes))
        .await
        .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))??;

    if !is_long_enough(&text) {
        return Err(AppError::BadRequest("PDF is empty or unreadable.".to_string()));
    }

    info!(
        file_name = %file_name,
        document_type = %document_type,
        chars = text.chars().count(),
        "Processing PDF"
    );
    let extraction = extraction.extract(&text, document_type.as_str()).await?;

    Ok(Json(ProcessResponse {
        document_type,
        extracted_data: extraction.data,
        raw_text_preview: text_preview(&text, PREVIEW_CHARS),
        tokens_used: extraction.tokens_used,
        timestamp: Utc::now().to_rfc3339(),
        confidence: extraction.confidence,
    }))
}

/// 处理原始文本
///
/// POST /process/text
///
/// 不校验 `document_type`：未知类型使用通用模板，响应中原样回显提交的值
pub async fn process_text(
    Extension(extraction): Extension<Arc<ExtractionService>>,
    payload: Result<Form<ProcessTextRequestDto>, FormRejection>,
) -> Result<Json<TextProcessResponse>, AppError> {
    counter!("docproc_requests_total", "route" => "/process/text").increment(1);
    let Form(payload) = payload?;

    if !is_long_enough(&payload.text) {
        return Err(AppError::BadRequest("Text is too short".to_string()));
    }

    let extraction = extraction
        .extract(&payload.text, &payload.document_type)
        .await?;

    Ok(Json(TextProcessResponse {
        document_type: payload.document_type,
        extracted_data: extraction.data,
        tokens_used: extraction.tokens_used,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
