// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::models::document::Confidence;
use crate::domain::services::llm_service::{CompletionClient, LlmError};
use crate::domain::services::prompt_catalog;
use crate::domain::services::response_parser;

/// 一次提取的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub data: Map<String, Value>,
    pub tokens_used: u64,
    pub confidence: Confidence,
    /// 模型回复无法解析，`data` 为占位内容
    pub degraded: bool,
}

/// 提取服务
///
/// 串联提示模板、LLM 补全和回复解析：选择模板，截断文本，调用模型，
/// 去掉代码围栏后解析 JSON。解析失败降级为占位结果，其余失败直接返回错误，不重试。
pub struct ExtractionService {
    client: Arc<dyn CompletionClient>,
}

impl ExtractionService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// 从文档文本中提取结构化数据
    ///
    /// # 参数
    ///
    /// * `text` - 文档文本
    /// * `document_type` - 文档类型键，未知键使用通用模板
    pub async fn extract(&self, text: &str, document_type: &str) -> Result<Extraction, LlmError> {
        let prompt = prompt_catalog::compose_prompt(document_type, text);

        let completion = self.client.complete(&prompt).await.map_err(|e| {
            counter!("docproc_llm_failures_total").increment(1);
            error!("LLM completion failed for {}: {}", document_type, e);
            e
        })?;

        let tokens_used = completion.usage.total();
        counter!("docproc_llm_tokens_total").increment(tokens_used);

        let parsed = response_parser::parse_reply(&completion.text);
        let confidence = response_parser::confidence_for(&parsed.data);
        info!(
            document_type,
            tokens_used,
            degraded = parsed.degraded,
            "Extraction completed"
        );

        Ok(Extraction {
            data: parsed.data,
            tokens_used,
            confidence,
            degraded: parsed.degraded,
        })
    }
}
