//! Pure ScrapingBee REST API client.
//!
//! A minimal client for the ScrapingBee HTML API. Supports rendered-page
//! fetches with server-side CSS extraction (`extract_rules`), returning the
//! extracted structure as typed JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use scrapingbee_client::{ExtractRequest, ExtractRule, ScrapingBeeClient};
//!
//! let client = ScrapingBeeClient::new("your-api-key");
//!
//! let request = ExtractRequest::new("https://example.com/jobs")
//!     .with_rule("headline", ExtractRule::text("h1"));
//! let value: serde_json::Value = client.extract(&request).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod types;

pub use credentials::SecretString;
pub use error::{Result, ScrapingBeeError};
pub use types::{DetailedRule, ExtractRequest, ExtractRule, RuleKind, RuleOutput};

use serde::de::DeserializeOwned;
use std::time::Duration;

const BASE_URL: &str = "https://app.scrapingbee.com/api/v1/";

/// Rendered fetches routinely take over a minute; ScrapingBee's own ceiling is 140s.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(140);

pub struct ScrapingBeeClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl ScrapingBeeClient {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request timeout applied on the client side.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a page and return the `extract_rules` output decoded as `T`.
    pub async fn extract<T: DeserializeOwned>(&self, request: &ExtractRequest) -> Result<T> {
        let params = request.query_pairs()?;

        tracing::debug!(
            url = %request.url,
            render_js = request.render_js,
            "Requesting ScrapingBee extraction"
        );

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("api_key", self.api_key.expose())])
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScrapingBeeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ScrapingBeeError::Parse(e.to_string()))
    }
}
