//! Error types for the CoinMarketCap client

use thiserror::Error;

/// Errors returned by the client, parsers and time helpers
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failures and timeouts. Never retried.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-200 response after the retry budget was spent
    #[error("API error (HTTP {status}, code {error_code:?}): {message}")]
    Api {
        status: u16,
        error_code: Option<i64>,
        message: String,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing field in payload: {0}")]
    MissingField(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("time_interval should be \"d, h, M, s\", got {0:?}")]
    InvalidPrecision(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of an API failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
