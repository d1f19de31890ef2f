pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod scraper;
pub mod smart_scraper;

#[cfg(test)]
mod testutil;

use std::sync::Arc;
use config::Config;
use smart_scraper::SmartScraper;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scraper: Arc<dyn SmartScraper>,
}
