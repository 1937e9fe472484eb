// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 未配置访问令牌时服务拒绝启动
    #[error("API_TOKEN is not configured")]
    MissingApiToken,
}

/// 应用程序配置设置
///
/// 包含服务器、认证、速率限制、LLM、CORS 和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 认证配置
    pub auth: AuthSettings,
    /// 速率限制配置
    pub rate_limiting: RateLimitingSettings,
    /// LLM 提供商配置
    pub llm: LlmSettings,
    /// CORS 配置
    pub cors: CorsSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 上传文件大小上限（MB）
    pub max_upload_mb: usize,
}

/// 认证配置设置
#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// Bearer 共享密钥
    pub api_token: String,
}

// Keep the secret out of debug output.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// 速率限制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitingSettings {
    /// 是否启用速率限制
    pub enabled: bool,
    /// 每个窗口允许的请求数
    pub requests_per_window: u32,
    /// 窗口长度（秒）
    pub window_secs: u64,
    /// 清理空闲 IP 的周期（秒），0 表示不清理
    pub sweep_interval_secs: u64,
}

/// LLM 提供商配置设置
#[derive(Clone, Deserialize)]
pub struct LlmSettings {
    /// 提供商 API 密钥，缺失时调用会失败
    pub api_key: Option<String>,
    /// 模型标识
    pub model: String,
    /// API 基础 URL
    pub api_base_url: String,
    /// 输出 token 上限
    pub max_tokens: u32,
    /// 采样温度
    pub temperature: f32,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[SET]"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// CORS 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// 允许的来源列表，为空时放行所有来源
    pub allowed_origins: Vec<String>,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 加载顺序：默认值 → `config/default` → `config/{APP_ENVIRONMENT}` →
    /// `DOCPROC__*` 环境变量 → 兼容旧部署的 `API_TOKEN`、`RATE_LIMIT`、`PORT`、
    /// `ANTHROPIC_API_KEY`
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(SettingsError)` - 配置加载失败或缺少访问令牌
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("DOCPROC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("auth.api_token", std::env::var("API_TOKEN").ok())?
            .set_override_option(
                "rate_limiting.requests_per_window",
                std::env::var("RATE_LIMIT").ok(),
            )?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("llm.api_key", std::env::var("ANTHROPIC_API_KEY").ok())?;

        Self::from_builder(builder)
    }

    /// 仅包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8001)?
            .set_default("server.max_upload_mb", 20)?
            .set_default("auth.api_token", "")?
            .set_default("rate_limiting.enabled", true)?
            .set_default("rate_limiting.requests_per_window", 30)?
            .set_default("rate_limiting.window_secs", 60)?
            .set_default("rate_limiting.sweep_interval_secs", 300)?
            .set_default("llm.model", "claude-haiku-4-5-20251001")?
            .set_default("llm.api_base_url", "https://api.anthropic.com")?
            .set_default("llm.max_tokens", 2048)?
            .set_default("llm.temperature", 0.2)?
            .set_default("llm.timeout_secs", 60)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 构建、反序列化并校验配置
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.api_token.trim().is_empty() {
            return Err(SettingsError::MissingApiToken);
        }
        Ok(())
    }

    /// 监听地址 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
