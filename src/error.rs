// src/error.rs

//! Unified error handling for the aggregator.

use thiserror::Error;

/// Result type alias for aggregator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed before a response was obtained
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error (missing credential, invalid setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Factory given a slug outside the supported set
    #[error("Unsupported news source: {slug}")]
    UnsupportedSource { slug: String },

    /// Provider responded with a non-success HTTP status, or the call was
    /// cut off before a status was obtained (attempt timeout)
    #[error("{provider} request failed{}{}", status.map(|s| format!(" with status {s}")).unwrap_or_default(), detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Transport {
        provider: String,
        status: Option<u16>,
        detail: Option<String>,
    },

    /// Provider payload reported an error in its own envelope
    #[error("{provider} returned error: {message}")]
    Provider { provider: String, message: String },

    /// Store rejected an insert due to the (url, source) uniqueness
    /// constraint. The aggregator treats this as "already exists",
    /// never as a failure.
    #[error("Article already stored: {url}")]
    Conflict { url: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a transport error for a provider response status.
    pub fn transport(source: impl Into<String>, status: u16, detail: Option<String>) -> Self {
        Self::Transport {
            provider: source.into(),
            status: Some(status),
            detail,
        }
    }

    /// Create a transport error for a timed-out attempt.
    pub fn timeout(source: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Transport {
            provider: source.into(),
            status: None,
            detail: Some(format!("timed out after {}s", after.as_secs())),
        }
    }

    /// Create a provider-envelope error.
    pub fn provider(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: source.into(),
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the job layer may retry after this error.
    ///
    /// Transport and provider failures are often transient (timeouts, rate
    /// limits, temporary outages). Configuration problems and unknown slugs
    /// are caller bugs and never resolve by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Transport { .. } | Self::Provider { .. } => true,
            Self::Io(_) | Self::Json(_) => true,
            Self::Config(_)
            | Self::UnsupportedSource { .. }
            | Self::Toml(_)
            | Self::Conflict { .. }
            | Self::Validation(_) => false,
        }
    }
}
