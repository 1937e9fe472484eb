// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动 Prometheus 导出器并登记指标说明
///
/// # 参数
///
/// * `listen_addr` - 导出器监听地址，例如 `0.0.0.0:9000`
pub fn init_metrics(listen_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr.parse()?;

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_counter!("docproc_requests_total", "Processing requests received per route");
    describe_counter!(
        "docproc_rate_limited_total",
        "Requests rejected by the per-IP rate limiter"
    );
    describe_counter!("docproc_llm_tokens_total", "Tokens consumed by LLM completions");
    describe_counter!("docproc_llm_failures_total", "Failed LLM completion calls");

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
