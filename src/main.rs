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

use docproc::config::settings::Settings;
use docproc::domain::services::extraction_service::ExtractionService;
use docproc::domain::services::llm_service::LLMService;
use docproc::infrastructure::pdf::text_extractor::{LopdfTextExtractor, TextExtractor};
use docproc::presentation::middleware::rate_limit_middleware::RateLimiter;
use docproc::presentation::routes::{self, AppState};
use docproc::utils::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting docproc...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    if settings.metrics.enabled {
        docproc::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr)?;
    }

    // 3. Initialize Rate Limiter
    let rate_limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limiting));
    let sweeper = match settings.rate_limiting.sweep_interval_secs {
        0 => None,
        secs => Some(rate_limiter.clone().spawn_sweeper(Duration::from_secs(secs))),
    };
    info!(
        "Rate limiter initialized: {} requests per {}s",
        settings.rate_limiting.requests_per_window, settings.rate_limiting.window_secs
    );

    // 4. Initialize LLM client and extraction pipeline
    let llm_service = LLMService::from_settings(&settings.llm)?;
    if !llm_service.is_configured() {
        warn!("ANTHROPIC_API_KEY is not configured; processing requests will fail");
    }
    let extraction = Arc::new(ExtractionService::new(Arc::new(llm_service)));
    let text_extractor: Arc<dyn TextExtractor> = Arc::new(LopdfTextExtractor);

    // 5. Start HTTP server
    let app = routes::routes(AppState {
        settings: settings.clone(),
        rate_limiter,
        extraction,
        text_extractor,
    });

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
