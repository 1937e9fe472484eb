// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

/// PDF 读取错误
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to load PDF: {0}")]
    Load(String),

    #[error("failed to extract text from page {page}: {reason}")]
    Extraction { page: u32, reason: String },
}

/// 文本提取器接口
///
/// 实现为同步调用，处理器在阻塞线程池中执行
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, PdfError>;
}

/// 基于 lopdf 的逐页文本提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextExtractor;

impl TextExtractor for LopdfTextExtractor {
    /// 按页序提取文本，每页后追加换行，最后去掉首尾空白
    fn extract(&self, bytes: &[u8]) -> Result<String, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))?;

        let mut text = String::new();
        for (page_num, _page_id) in doc.get_pages() {
            let content = doc
                .extract_text(&[page_num])
                .map_err(|e| PdfError::Extraction {
                    page: page_num,
                    reason: e.to_string(),
                })?;
            text.push_str(&content);
            text.push('\n');
        }

        debug!("Extracted {} characters from PDF", text.len());
        Ok(text.trim().to_string())
    }
}
