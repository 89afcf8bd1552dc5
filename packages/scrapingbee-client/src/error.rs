//! Error types for the ScrapingBee client.

use thiserror::Error;

/// Result type for ScrapingBee client operations.
pub type Result<T> = std::result::Result<T, ScrapingBeeError>;

/// ScrapingBee client errors.
#[derive(Debug, Error)]
pub enum ScrapingBeeError {
    /// Transport failure (connection refused, DNS, client timeout).
    /// The request URL is stripped since it carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Non-2xx response from the API
    #[error("ScrapingBee API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Extraction rules could not be encoded
    #[error("Invalid extract rules: {0}")]
    Rules(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ScrapingBeeError {
    fn from(e: reqwest::Error) -> Self {
        ScrapingBeeError::Http(e.without_url())
    }
}

impl ScrapingBeeError {
    /// Whether the failure came from the client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapingBeeError::Http(e) if e.is_timeout())
    }
}
