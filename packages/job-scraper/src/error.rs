//! Typed errors for the import pipeline.
//!
//! Per-source failures (`SourceFetch`, `DedupQuery`, `ImportWrite`) are caught
//! by the pipeline and turned into a per-source report. `Configuration` is the
//! only variant allowed to stop a process.

use scrapingbee_client::ScrapingBeeError;
use thiserror::Error;

/// Errors that can occur while fetching and extracting one source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Rendering service call failed
    #[error("{0}")]
    Client(#[from] ScrapingBeeError),

    /// Direct HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Board answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection-level failure reported by a fetch backend
    #[error("transport error: {0}")]
    Transport(String),

    /// Response did not have the expected shape
    #[error("unparseable response: {0}")]
    Parse(String),

    /// A configured CSS selector could not be parsed
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// Source URL is not a valid absolute URL
    #[error("invalid source URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors raised by a job store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query or write failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable not set
    #[error("{0} must be set")]
    Missing(&'static str),

    /// Value present but unusable
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Site catalog file could not be read or validated
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Classifier pattern failed to compile
    #[error("invalid classifier pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },
}

/// Failure of one pipeline stage, or of startup.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    SourceFetch(#[source] FetchError),

    #[error("existing-listing lookup failed: {0}")]
    DedupQuery(#[source] StoreError),

    #[error("import write failed: {0}")]
    ImportWrite(#[source] StoreError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
