// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 未提交时使用的文档类型
pub const DEFAULT_DOCUMENT_TYPE: &str = "generic";

/// 文档文本的最少字符数
pub const MIN_TEXT_CHARS: usize = 50;

fn default_document_type() -> String {
    DEFAULT_DOCUMENT_TYPE.to_string()
}

/// `POST /process/text` 的表单
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessTextRequestDto {
    pub text: String,
    #[serde(default = "default_document_type")]
    pub document_type: String,
}

/// 文本是否达到最少字符数
pub fn is_long_enough(text: &str) -> bool {
    text.chars().count() >= MIN_TEXT_CHARS
}
