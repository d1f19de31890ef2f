//! Shared test helpers: a recording mock scraper and router builders.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use scraper_web::AppState;
use scraper_web::api::routes::create_router;
use scraper_web::config::{Config, DEFAULT_GROQ_BASE_URL, DEFAULT_MODEL, ScrapeConfig};
use scraper_web::error::{AppError, Result};
use scraper_web::smart_scraper::SmartScraper;

pub const TEST_API_KEY: &str = "gsk_test_key";

/// One recorded `run` call: (prompt, source, config).
pub type RecordedCall = (String, String, ScrapeConfig);

/// Mock scraper returning queued results and recording every call.
#[derive(Clone)]
pub struct MockScraper {
    responses: Arc<Mutex<Vec<Result<serde_json::Value>>>>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockScraper {
    pub fn new(data: serde_json::Value) -> Self {
        Self::with_responses(vec![Ok(data)])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<serde_json::Value>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SmartScraper for MockScraper {
    async fn run(&self, prompt: &str, source: &str, config: &ScrapeConfig) -> Result<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), source.to_string(), config.clone()));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(serde_json::json!({"default": true}))
        } else {
            responses.remove(0)
        }
    }
}

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        groq_api_key: api_key.map(str::to_string),
        model: DEFAULT_MODEL.to_string(),
        groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
        verbose: false,
        headless: true,
        fetch_timeout: Duration::from_secs(5),
        llm_timeout: Duration::from_secs(5),
        max_content_chars: 1_000,
    }
}

pub fn test_router(config: Config, scraper: MockScraper) -> Router {
    create_router(AppState {
        config: Arc::new(config),
        scraper: Arc::new(scraper),
    })
}

/// Sends a GET and returns the status plus the parsed JSON body.
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}
