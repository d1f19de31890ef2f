use axum::{
    routing::get,
    Router,
    extract::{rejection::QueryRejection, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::api::models::{EndpointInfo, HealthResponse, ScrapeQuery, ScrapeRequest, ServiceInfo};
use crate::api::response;
use crate::AppState;

pub const SERVICE_NAME: &str = "ScraperWeb";

pub const CITATIONS_URL: &str = "https://en.wikipedia.org/wiki/Web_scraping";
pub const CITATIONS_PROMPT: &str = "List every citation on this page with its title and link";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/scrape", get(scrape_handler))
        .route("/citations", get(citations_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "Extracts structured data from a web page with an LLM, guided by a natural-language prompt",
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/scrape?url=<url>&prompt=<prompt>",
                description: "Scrape a page and extract what the prompt asks for",
            },
            EndpointInfo {
                method: "GET",
                path: "/citations",
                description: "Example scrape listing the citations of a Wikipedia article",
            },
            EndpointInfo {
                method: "GET",
                path: "/health",
                description: "Service health check",
            },
        ],
    })
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

async fn scrape_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response> {
    let Query(pairs) = query.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let req = ScrapeQuery::from_pairs(pairs).validate()?;
    Ok(process_scrape_request(&state, req).await)
}

async fn citations_handler(State(state): State<AppState>) -> Response {
    let req = ScrapeRequest {
        url: CITATIONS_URL.to_string(),
        prompt: CITATIONS_PROMPT.to_string(),
    };
    process_scrape_request(&state, req).await
}

async fn process_scrape_request(state: &AppState, req: ScrapeRequest) -> Response {
    // No network call at all without a credential.
    let scrape_config = match state.config.scrape_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Refusing scrape of {}: {}", req.url, err);
            return err.into_response();
        }
    };

    tracing::info!(url = %req.url, model = %scrape_config.model, "Processing scrape request");
    let start_time = Instant::now();

    let result = state.scraper.run(&req.prompt, &req.url, &scrape_config).await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(data) => {
            tracing::info!(url = %req.url, ?elapsed, "Scrape succeeded");
            response::success(req, data).into_response()
        }
        Err(err) => {
            // Whatever went wrong inside the scraper is reported as a plain 500.
            tracing::warn!(url = %req.url, ?elapsed, error = %err, "Scrape failed");
            response::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
