//! The scrape-and-extract collaborator behind `/scrape`.
//!
//! Handlers only see the [`SmartScraper`] trait; [`GroqSmartScraper`] is the
//! production implementation (fetch page, keep body text, one Groq chat
//! completion, parse JSON).

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};

use crate::config::{Config, ScrapeConfig};
use crate::error::{AppError, Result};
use crate::llm::{call_groq, parse_completion};
use crate::scraper::{build_prompt, collapse_lines, extract_body_text, fetch_html, truncate_chars, validate_source};

const USER_AGENT: &str = "ScraperWeb/0.1 (AI scraper)";

#[async_trait]
pub trait SmartScraper: Send + Sync {
    /// Extracts whatever `prompt` asks for from the page at `source`.
    ///
    /// The result is free-form JSON, shaped by the model's answer.
    async fn run(&self, prompt: &str, source: &str, config: &ScrapeConfig) -> Result<serde_json::Value>;
}

pub struct GroqSmartScraper {
    page_client: Client,
    llm_client: Client,
    base_url: String,
    max_content_chars: usize,
}

impl GroqSmartScraper {
    pub fn new(
        base_url: impl Into<String>,
        fetch_timeout: Duration,
        llm_timeout: Duration,
        max_content_chars: usize,
    ) -> Result<Self> {
        let page_client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(fetch_timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let llm_client = ClientBuilder::new()
            .timeout(llm_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build LLM client: {}", e)))?;

        let base_url: String = base_url.into();
        Ok(Self {
            page_client,
            llm_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_content_chars,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.groq_base_url.clone(),
            config.fetch_timeout,
            config.llm_timeout,
            config.max_content_chars,
        )
    }
}

#[async_trait]
impl SmartScraper for GroqSmartScraper {
    async fn run(&self, prompt: &str, source: &str, config: &ScrapeConfig) -> Result<serde_json::Value> {
        let url = validate_source(source)?;
        if config.verbose {
            tracing::info!(%url, model = %config.model, headless = config.headless, "Starting smart scrape");
        }

        let fetch_start = Instant::now();
        let html = fetch_html(&self.page_client, url).await?;
        tracing::debug!(bytes = html.len(), elapsed = ?fetch_start.elapsed(), "Fetched page");

        let raw_text = extract_body_text(&html)
            .ok_or_else(|| AppError::ParseError("No <body> tag found in the HTML".to_string()))?;
        let text = collapse_lines(&raw_text);
        let content = truncate_chars(&text, self.max_content_chars);
        if content.len() < text.len() {
            tracing::debug!(chars = self.max_content_chars, "Page text truncated");
        }

        let llm_prompt = build_prompt(prompt, source, content);
        if config.verbose {
            tracing::info!(prompt_chars = llm_prompt.len(), "Calling {}", config.model);
            tracing::debug!(prompt = %llm_prompt, "LLM prompt");
        }

        let llm_start = Instant::now();
        let completion = call_groq(&self.llm_client, &self.base_url, &config.api_key, &config.model, &llm_prompt).await?;
        tracing::debug!(elapsed = ?llm_start.elapsed(), "LLM call finished");
        if config.verbose {
            tracing::info!(completion = %completion, "LLM completion");
        }

        parse_completion(&completion)
    }
}
