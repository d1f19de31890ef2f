use std::env::{self, VarError};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL: &str = "groq/llama3-8b-8192";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Server-wide settings, loaded once at startup.
///
/// The Groq key is optional here: the server still boots without it and only
/// `/scrape` refuses to work.
#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub groq_api_key: Option<String>,
    pub model: String,
    pub groq_base_url: String,
    pub verbose: bool,
    pub headless: bool,
    pub fetch_timeout: Duration,
    pub llm_timeout: Duration,
    pub max_content_chars: usize,
}

/// Per-call settings handed to the smart scraper.
#[derive(Clone)]
pub struct ScrapeConfig {
    pub api_key: String,
    pub model: String,
    pub verbose: bool,
    pub headless: bool,
}

impl fmt::Debug for ScrapeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("verbose", &self.verbose)
            .field("headless", &self.headless)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_vars(|key| env::var(key))
    }

    /// Builds the config from any `env::var`-shaped lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let lookup = |key: &str| -> Result<Option<String>> {
            match var(key) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(None),
                Err(e) => Err(e.into()),
            }
        };

        let groq_api_key = lookup("GROQ_API_KEY")?.filter(|key| !key.trim().is_empty());

        // Load server configuration with defaults
        let host = lookup("HOST")?.unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT")?.unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let model = lookup("GROQ_MODEL")?.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let groq_base_url = lookup("GROQ_BASE_URL")?
            .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let verbose = parse_flag("SCRAPER_VERBOSE", lookup("SCRAPER_VERBOSE")?, false)?;
        let headless = parse_flag("SCRAPER_HEADLESS", lookup("SCRAPER_HEADLESS")?, true)?;

        let fetch_timeout = parse_timeout("FETCH_TIMEOUT_SECS", lookup("FETCH_TIMEOUT_SECS")?, 15)?;
        let llm_timeout = parse_timeout("LLM_TIMEOUT_SECS", lookup("LLM_TIMEOUT_SECS")?, 60)?;
        let max_content_chars = parse_number("MAX_CONTENT_CHARS", lookup("MAX_CONTENT_CHARS")?, 20_000)? as usize;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            groq_api_key,
            model,
            groq_base_url,
            verbose,
            headless,
            fetch_timeout,
            llm_timeout,
            max_content_chars,
        })
    }

    /// Assembles a fresh scrape configuration for one request.
    ///
    /// Fails with [`AppError::MissingApiKey`] when no credential is configured.
    pub fn scrape_config(&self) -> Result<ScrapeConfig> {
        let api_key = self
            .groq_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingApiKey)?;

        Ok(ScrapeConfig {
            api_key: api_key.to_string(),
            model: self.model.clone(),
            verbose: self.verbose,
            headless: self.headless,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::ConfigError(format!("Invalid boolean for {}: {}", key, other))),
    }
}

fn parse_number(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| AppError::ConfigError(format!("Invalid value for {}: {}", key, e))),
        None => Ok(default),
    }
}

/// A zero timeout would fail every request, so it is rejected.
fn parse_timeout(key: &str, value: Option<String>, default_secs: u64) -> Result<Duration> {
    match parse_number(key, value, default_secs)? {
        0 => Err(AppError::ConfigError(format!("{} must be greater than 0", key))),
        secs => Ok(Duration::from_secs(secs)),
    }
}
