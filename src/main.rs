use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use scraper_web::{
    config::Config,
    api::routes::create_router,
    smart_scraper::GroqSmartScraper,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (also reads .env, so RUST_LOG may come from there)
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scraper_web=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    if config.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; /scrape will answer 500 until it is configured");
    }

    let server_addr = config.server_addr;
    let scraper = GroqSmartScraper::from_config(&config)?;
    tracing::info!(model = %config.model, base_url = %config.groq_base_url, "Smart scraper ready");

    // Create application state
    let app_state = AppState {
        config: Arc::new(config),
        scraper: Arc::new(scraper),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
