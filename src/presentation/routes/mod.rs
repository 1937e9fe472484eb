// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CorsSettings, Settings};
use crate::domain::services::extraction_service::ExtractionService;
use crate::infrastructure::pdf::text_extractor::TextExtractor;
use crate::presentation::handlers::{info_handler, process_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use crate::presentation::middleware::rate_limit_middleware::{rate_limit_middleware, RateLimiter};
use crate::presentation::middleware::token_query_guard::token_query_guard;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 路由依赖的组件
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub rate_limiter: Arc<RateLimiter>,
    pub extraction: Arc<ExtractionService>,
    pub text_extractor: Arc<dyn TextExtractor>,
}

/// 创建应用路由
///
/// 公开路由：`/`、`/health`；受保护路由先认证再限流。
/// 携带 `token` 查询参数的请求在所有路由上都会被拒绝。
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(info_handler::root))
        .route("/health", get(info_handler::health_check));

    let mut protected_routes = Router::new()
        .route("/templates", get(info_handler::templates))
        .route("/process/pdf", post(process_handler::process_pdf))
        .route("/process/text", post(process_handler::process_text));

    if state.settings.rate_limiting.enabled {
        protected_routes = protected_routes.layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ));
    } else {
        warn!("Rate limiting is disabled");
    }

    let protected_routes = protected_routes
        .layer(middleware::from_fn_with_state(
            AuthState::new(state.settings.auth.api_token.as_str()),
            auth_middleware,
        ))
        .layer(Extension(state.extraction.clone()))
        .layer(Extension(state.text_extractor.clone()));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(
            state.settings.server.max_upload_mb * 1024 * 1024,
        ))
        .layer(middleware::from_fn(token_query_guard))
        .layer(cors_layer(&state.settings.cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!(
            "CORS configured to allow all origins. Set DOCPROC__CORS__ALLOWED_ORIGINS to a \
             comma-separated list of origins for production."
        );
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS configured with {} allowed origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
