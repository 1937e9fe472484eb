// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::LlmSettings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM 调用错误
///
/// 这些错误对外统一表现为不透明的内部错误，细节只写入日志
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM API key not configured")]
    MissingApiKey,

    #[error("failed to reach LLM API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API returned error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("LLM API reply contained no text content")]
    EmptyReply,
}

/// 提供商报告的 token 用量
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// 单次补全的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// 模型的原始文本回复
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发送单轮提示并返回原始回复
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError>;
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// LLM服务 - 处理与 Anthropic Messages API 的交互
///
/// # 配置
///
/// 通过 [`LlmSettings`] 进行配置：
/// - `api_key` - 提供商 API 密钥，缺失时每次调用都会失败
/// - `model` - 模型标识
/// - `api_base_url` - API 基础 URL
/// - `max_tokens` / `temperature` - 输出 token 上限和采样温度
/// - `timeout_secs` - 单次请求超时
pub struct LLMService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    max_tokens: u32,
    temperature: f32,
}

#[async_trait]
impl CompletionClient for LLMService {
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        LLMService::complete(self, prompt).await
    }
}

impl LLMService {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    /// 是否已配置 API 密钥
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// 调用补全接口
    ///
    /// # 参数
    /// * `prompt` - 已组装好的完整提示
    ///
    /// # 返回值
    /// * `Result<Completion, LlmError>` - 模型原始回复和 token 用量
    ///
    /// # 错误
    /// * 当 API 密钥未配置时返回错误
    /// * 当网络请求失败、返回非成功状态或回复中没有文本时返回错误
    pub async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let url = format!("{}/v1/messages", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let body: MessagesResponse = response.json().await?;
        let text = body
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(LlmError::EmptyReply)?;

        Ok(Completion {
            text,
            usage: body.usage,
        })
    }
}
