// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 文档类型
///
/// 决定使用哪一个提取提示模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// 发票
    Invoice,
    /// 简历
    Cv,
    /// 通用文档
    Generic,
}

impl DocumentType {
    /// 所有受支持的类型，按对外公布的顺序排列
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Invoice,
        DocumentType::Cv,
        DocumentType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Cv => "cv",
            DocumentType::Generic => "generic",
        }
    }

    /// 已知类型原样返回，未知类型回退到 `Generic`
    pub fn or_generic(key: &str) -> Self {
        key.parse().unwrap_or(DocumentType::Generic)
    }

    pub fn supported_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(DocumentType::as_str).collect()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知文档类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentType::Invoice),
            "cv" => Ok(DocumentType::Cv),
            "generic" => Ok(DocumentType::Generic),
            other => Err(UnknownDocumentType(other.to_string())),
        }
    }
}

/// 置信度标签
///
/// 由提取结果的序列化长度粗略推断，不是统计意义上的置信度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

/// PDF 处理接口的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub document_type: DocumentType,
    pub extracted_data: Map<String, Value>,
    pub raw_text_preview: String,
    pub tokens_used: u64,
    pub timestamp: String,
    pub confidence: Confidence,
}

/// 文本处理接口的响应
///
/// `document_type` 回显客户端提交的原始值，即使提示模板已回退到通用模板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextProcessResponse {
    pub document_type: String,
    pub extracted_data: Map<String, Value>,
    pub tokens_used: u64,
    pub timestamp: String,
}

/// 截断文本用于预览，超过 `limit` 个字符时追加 `...`
pub fn text_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
