// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{bearer, create_test_app, create_test_app_with_limit, StubCompletionClient};
use axum::http::StatusCode;
use serde_json::Value;

const CLIENT: &str = "203.0.113.7";

#[tokio::test]
async fn test_requests_beyond_limit_are_rejected() {
    let app = create_test_app_with_limit(StubCompletionClient::replying("{}"), 3);

    for _ in 0..3 {
        let response = app
            .server
            .get("/templates")
            .add_header("Authorization", bearer())
            .add_header("x-forwarded-for", CLIENT)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = app
        .server
        .get("/templates")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get("retry-after").is_some());
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("Too many requests"));
    assert_eq!(app.rate_limiter.recorded(CLIENT), 3);
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let app = create_test_app_with_limit(StubCompletionClient::replying("{}"), 1);

    app.server
        .get("/templates")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .await;

    let response = app
        .server
        .get("/templates")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", "198.51.100.2, 10.0.0.1")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.rate_limiter.recorded("198.51.100.2"), 1);
}

#[tokio::test]
async fn test_unauthenticated_requests_do_not_consume_quota() {
    let app = create_test_app_with_limit(StubCompletionClient::replying("{}"), 1);

    for _ in 0..5 {
        let response = app
            .server
            .get("/templates")
            .add_header("x-forwarded-for", CLIENT)
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(app.rate_limiter.recorded(CLIENT), 0);

    let response = app
        .server
        .get("/templates")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_routes_are_not_limited() {
    let app = create_test_app_with_limit(StubCompletionClient::replying("{}"), 1);

    for _ in 0..5 {
        let response = app
            .server
            .get("/health")
            .add_header("x-forwarded-for", CLIENT)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
    assert_eq!(app.rate_limiter.tracked_clients(), 0);
}

#[tokio::test]
async fn test_rejected_requests_skip_the_handler() {
    let llm = StubCompletionClient::replying("{}");
    let app = create_test_app_with_limit(llm.clone(), 1);
    let text = "Un texto suficientemente largo para pasar el mínimo de cincuenta caracteres.";

    app.server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .form(&[("text", text)])
        .await;
    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .form(&[("text", text)])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_default_limit_is_thirty() {
    let app = create_test_app(StubCompletionClient::replying("{}"));

    for _ in 0..30 {
        app.server
            .get("/templates")
            .add_header("Authorization", bearer())
            .add_header("x-forwarded-for", CLIENT)
            .await;
    }
    let response = app
        .server
        .get("/templates")
        .add_header("Authorization", bearer())
        .add_header("x-forwarded-for", CLIENT)
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
}
