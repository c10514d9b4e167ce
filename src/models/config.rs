//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-provider credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Fetch cycle defaults
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Job retry behavior
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.retry.attempt_timeout_secs == 0 {
            return Err(AppError::validation(
                "retry.attempt_timeout_secs must be > 0",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Credentials for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// API key
    #[serde(default)]
    pub key: Option<String>,

    /// API secret (only the NY Times issues one; unused by its read APIs)
    #[serde(default)]
    pub secret: Option<String>,
}

impl ProviderCredentials {
    /// The key, if present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Credential block for all providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub newsapi: ProviderCredentials,

    #[serde(default)]
    pub guardian: ProviderCredentials,

    #[serde(default)]
    pub nytimes: ProviderCredentials,
}

/// Fetch cycle defaults applied per provider where supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Article language (NewsAPI only)
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Result page size; None uses each provider's default
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Category filter (NewsAPI only)
    #[serde(default)]
    pub category: Option<String>,

    /// Top-stories section (NY Times only)
    #[serde(default = "defaults::section")]
    pub section: String,

    /// Maximum sources fetched concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            language: defaults::language(),
            page_size: None,
            category: None,
            section: defaults::section(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Job retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of attempts before a job gives up
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay before each retry, in seconds. When there are more retries
    /// than entries, the last entry repeats.
    #[serde(default = "defaults::backoff_secs")]
    pub backoff_secs: Vec<u64>,

    /// Wall-clock cap on a single attempt, in seconds
    #[serde(default = "defaults::attempt_timeout")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            backoff_secs: defaults::backoff_secs(),
            attempt_timeout_secs: defaults::attempt_timeout(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; newswire/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn language() -> String {
        "en".into()
    }
    pub fn section() -> String {
        "home".into()
    }
    pub fn max_concurrent() -> usize {
        3
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn backoff_secs() -> Vec<u64> {
        vec![60, 300, 900]
    }
    pub fn attempt_timeout() -> u64 {
        120
    }
}
