// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use metrics::counter;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::settings::RateLimitingSettings;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::client_ip::ClientIp;

/// 速率限制错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// 请求过多错误
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { retry_after: Duration },
}

/// 速率限制器
///
/// 按客户端 IP 的固定窗口计数器。每个 IP 保存窗口内的请求时间戳，
/// 检查与记录在同一个分片锁内完成，同一 IP 的并发请求不会越过上限。
#[derive(Debug)]
pub struct RateLimiter {
    /// IP -> 窗口内的请求时间
    ledger: DashMap<String, VecDeque<Instant>>,
    /// 每个窗口允许的请求数
    limit: usize,
    /// 窗口长度
    window: Duration,
}

impl RateLimiter {
    /// 创建新的速率限制器实例
    ///
    /// # 参数
    ///
    /// * `limit` - 每个窗口允许的请求数
    /// * `window` - 窗口长度
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            ledger: DashMap::new(),
            limit: limit as usize,
            window,
        }
    }

    pub fn from_settings(settings: &RateLimitingSettings) -> Self {
        Self::new(
            settings.requests_per_window,
            Duration::from_secs(settings.window_secs),
        )
    }

    /// 检查并记录一次请求
    ///
    /// 先丢弃窗口外的时间戳；已达上限时拒绝且不记录本次请求，否则记录当前时间。
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 请求未超出限制
    /// * `Err(RateLimitError)` - 请求超出限制，附带建议的重试等待时间
    pub fn check(&self, client_ip: &str) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let mut stamps = self.ledger.entry(client_ip.to_string()).or_default();
        prune(&mut stamps, now, self.window);

        if stamps.len() >= self.limit {
            let retry_after = stamps
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return Err(RateLimitError::TooManyRequests { retry_after });
        }

        stamps.push_back(now);
        Ok(())
    }

    /// 当前窗口内某个 IP 已记录的请求数
    pub fn recorded(&self, client_ip: &str) -> usize {
        let now = Instant::now();
        self.ledger
            .get(client_ip)
            .map(|stamps| {
                stamps
                    .iter()
                    .filter(|t| now.duration_since(**t) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// 账本中的 IP 数量
    pub fn tracked_clients(&self) -> usize {
        self.ledger.len()
    }

    /// 移除窗口内没有请求的 IP，返回移除数量
    pub fn evict_stale(&self) -> usize {
        let now = Instant::now();
        let before = self.ledger.len();
        self.ledger.retain(|_, stamps| {
            prune(stamps, now, self.window);
            !stamps.is_empty()
        });
        before.saturating_sub(self.ledger.len())
    }

    /// 启动周期清理任务
    ///
    /// 返回的句柄在服务关闭时中止
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = self.evict_stale();
                if evicted > 0 {
                    debug!(
                        "Rate limiter evicted {} idle clients, {} remaining",
                        evicted,
                        self.tracked_clients()
                    );
                }
            }
        })
    }
}

fn prune(stamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = stamps.front() {
        if now.duration_since(*oldest) >= window {
            stamps.pop_front();
        } else {
            break;
        }
    }
}

/// 速率限制中间件
///
/// 按客户端 IP 限流，必须挂在认证中间件之内
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RateLimiter>>,
    ClientIp(client_ip): ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = rate_limiter.check(&client_ip) {
        counter!("docproc_rate_limited_total").increment(1);
        warn!("Rate limit check failed for {}: {}", client_ip, e);
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
