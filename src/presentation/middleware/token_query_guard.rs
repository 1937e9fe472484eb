// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use crate::presentation::errors::AppError;

/// 拒绝携带 `token` 查询参数的请求
///
/// 挂在最外层，公开路由同样适用，避免令牌出现在 URL 和访问日志中
pub async fn token_query_guard(request: Request, next: Next) -> Result<Response, AppError> {
    if request.uri().query().is_some_and(has_token_param) {
        warn!("Rejected request to {} carrying a token query parameter", request.uri().path());
        return Err(AppError::Unauthorized("Unauthorized"));
    }

    Ok(next.run(request).await)
}

fn has_token_param(query: &str) -> bool {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.iter().any(|(key, _)| key == "token"),
        Err(_) => query
            .split('&')
            .any(|pair| pair.split('=').next() == Some("token")),
    }
}
