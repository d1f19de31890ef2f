use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

use crate::api::models::{ScrapeRequest, ScrapeResponse};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub fn success(req: ScrapeRequest, data: serde_json::Value) -> (StatusCode, Json<ScrapeResponse>) {
    (
        StatusCode::OK,
        Json(ScrapeResponse {
            status: "success".to_string(),
            url: req.url,
            prompt: req.prompt,
            data,
        }),
    )
}

pub fn error(status: StatusCode, detail: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { detail }))
}
