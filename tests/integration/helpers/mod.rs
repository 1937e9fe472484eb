// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use docproc::config::settings::Settings;
use docproc::domain::services::extraction_service::ExtractionService;
use docproc::domain::services::llm_service::{Completion, CompletionClient, LlmError, TokenUsage};
use docproc::infrastructure::pdf::text_extractor::{LopdfTextExtractor, TextExtractor};
use docproc::presentation::middleware::rate_limit_middleware::RateLimiter;
use docproc::presentation::routes::{self, AppState};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use std::sync::Arc;

pub const API_TOKEN: &str = "integration-test-token";

/// Each page alone is below the 50 character minimum, together they pass
pub const INVOICE_PAGES: [&str; 2] = [
    "Factura F-2025-001 emitida por Talleres Lago SL",
    "Total a pagar: 121.00 EUR con IVA incluido",
];

pub fn bearer() -> String {
    format!("Bearer {}", API_TOKEN)
}

/// 记录提示并返回固定回复的模型桩
pub struct StubCompletionClient {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompletionClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for StubCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                usage: TokenUsage {
                    input_tokens: 300,
                    output_tokens: 45,
                },
            }),
            None => Err(LlmError::Status {
                status: 401,
                body: "invalid x-api-key sk-ant-do-not-leak".to_string(),
            }),
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub llm: Arc<StubCompletionClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

pub fn create_test_app(llm: Arc<StubCompletionClient>) -> TestApp {
    create_test_app_with_limit(llm, 30)
}

pub fn create_test_app_with_limit(llm: Arc<StubCompletionClient>, limit: u32) -> TestApp {
    let builder = Settings::defaults()
        .unwrap()
        .set_override("auth.api_token", API_TOKEN)
        .unwrap()
        .set_override("rate_limiting.requests_per_window", i64::from(limit))
        .unwrap();
    let settings = Arc::new(Settings::from_builder(builder).unwrap());

    let rate_limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limiting));
    let text_extractor: Arc<dyn TextExtractor> = Arc::new(LopdfTextExtractor);
    let app = routes::routes(AppState {
        settings,
        rate_limiter: rate_limiter.clone(),
        extraction: Arc::new(ExtractionService::new(llm.clone())),
        text_extractor,
    });

    TestApp {
        server: TestServer::new(app).unwrap(),
        llm,
        rate_limiter,
    }
}

/// 生成每页一行文字的 PDF
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
