// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{bearer, create_test_app, StubCompletionClient};
use axum::http::StatusCode;
use docproc::domain::models::document::DocumentType;
use docproc::domain::services::prompt_catalog;
use serde_json::Value;

const INVOICE_TEXT: &str =
    "Factura F-2025-001. Talleres Lago SL. Fecha 2025-03-14. Total 121.00 EUR, IVA 21%.";

#[tokio::test]
async fn test_process_text_requires_auth() {
    let llm = StubCompletionClient::replying("{}");
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .form(&[("text", INVOICE_TEXT)])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_process_text_rejects_wrong_token() {
    let app = create_test_app(StubCompletionClient::replying("{}"));

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", "Bearer not-the-token")
        .form(&[("text", INVOICE_TEXT)])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Invalid or unauthorized token");
}

#[tokio::test]
async fn test_process_text_too_short() {
    let llm = StubCompletionClient::replying("{}");
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", "Factura 1"), ("document_type", "invoice")])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Text is too short");
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_process_text_success() {
    let llm = StubCompletionClient::replying(
        "```json\n{\"numero_factura\": \"F-2025-001\", \"total\": 121.0}\n```",
    );
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", INVOICE_TEXT), ("document_type", "invoice")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["document_type"], "invoice");
    assert_eq!(body["extracted_data"]["numero_factura"], "F-2025-001");
    assert_eq!(body["tokens_used"], 345);
    assert!(body["timestamp"].as_str().is_some());
    assert!(body.get("confidence").is_none());
    assert!(body.get("raw_text_preview").is_none());

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.starts_with(prompt_catalog::template(DocumentType::Invoice)));
    assert!(prompt.ends_with(INVOICE_TEXT));
}

#[tokio::test]
async fn test_process_text_defaults_to_generic() {
    let llm = StubCompletionClient::replying("{\"tipo\": \"nota\"}");
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", INVOICE_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["document_type"], "generic");
    assert!(llm
        .last_prompt()
        .unwrap()
        .starts_with(prompt_catalog::template(DocumentType::Generic)));
}

#[tokio::test]
async fn test_process_text_unknown_type_echoed_with_generic_prompt() {
    let llm = StubCompletionClient::replying("{\"tipo\": \"recibo\"}");
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", INVOICE_TEXT), ("document_type", "receipt")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["document_type"], "receipt");
    assert!(llm
        .last_prompt()
        .unwrap()
        .starts_with(prompt_catalog::template(DocumentType::Generic)));
}

#[tokio::test]
async fn test_process_text_degraded_reply() {
    let app = create_test_app(StubCompletionClient::replying("Lo siento, no puedo."));

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", INVOICE_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["extracted_data"]["raw_response"], "Formato no válido");
    assert!(body["extracted_data"]["warning"].as_str().is_some());
    assert_eq!(body["tokens_used"], 345);
}

#[tokio::test]
async fn test_process_text_llm_failure_is_opaque() {
    let app = create_test_app(StubCompletionClient::failing());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("text", INVOICE_TEXT)])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Internal error");
    assert!(!response.text().contains("sk-ant"));
}

#[tokio::test]
async fn test_process_text_missing_field_keeps_detail_body() {
    let llm = StubCompletionClient::replying("{}");
    let app = create_test_app(llm.clone());

    let response = app
        .server
        .post("/process/text")
        .add_header("Authorization", bearer())
        .form(&[("document_type", "invoice")])
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("text"));
    assert_eq!(llm.calls(), 0);
}
