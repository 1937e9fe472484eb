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
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::presentation::errors::AppError;

const MISSING_TOKEN: &str = "Missing Authorization: Bearer <token> header";
const INVALID_TOKEN: &str = "Invalid or unauthorized token";

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 服务端配置的共享密钥
    pub api_token: Arc<str>,
}

impl AuthState {
    pub fn new(api_token: impl Into<Arc<str>>) -> Self {
        Self {
            api_token: api_token.into(),
        }
    }
}

/// 认证中间件
///
/// 要求 `Authorization: Bearer <token>` 与配置的密钥完全一致，
/// 在限流和业务逻辑之前执行
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(AppError::Unauthorized)` - 缺少、格式错误或不匹配的令牌
pub async fn auth_middleware(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!("AuthMiddleware processing path: {}", req.uri().path());

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AppError::Unauthorized(MISSING_TOKEN))?;

    let (scheme, credentials) = match auth_header.split_once(' ') {
        Some((scheme, credentials)) => (scheme, credentials.trim()),
        None => return Err(AppError::Unauthorized(MISSING_TOKEN)),
    };

    if credentials.is_empty() {
        return Err(AppError::Unauthorized(MISSING_TOKEN));
    }

    if !scheme.eq_ignore_ascii_case("bearer") || credentials != &*state.api_token {
        warn!("Rejected request to {} with invalid token", req.uri().path());
        return Err(AppError::Unauthorized(INVALID_TOKEN));
    }

    Ok(next.run(req).await)
}
