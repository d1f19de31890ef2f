use serde::Serialize;
use crate::error::{AppError, Result};

/// Raw `/scrape` query parameters. Fields are optional so that missing
/// parameters get our own error body instead of axum's plain-text rejection.
#[derive(Debug, Default)]
pub struct ScrapeQuery {
    pub url: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub prompt: String,
}

impl ScrapeQuery {
    /// Collects `url` and `prompt` from decoded query pairs. A repeated key
    /// keeps its last value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "url" => query.url = Some(value),
                "prompt" => query.prompt = Some(value),
                _ => {}
            }
        }
        query
    }

    pub fn validate(self) -> Result<ScrapeRequest> {
        Ok(ScrapeRequest {
            url: required("url", self.url)?,
            prompt: required("prompt", self.prompt)?,
        })
    }
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(AppError::InvalidRequest(format!("Query parameter '{}' must not be empty", name))),
        None => Err(AppError::InvalidRequest(format!("Missing required query parameter '{}'", name))),
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub status: String,
    pub url: String,
    pub prompt: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}
