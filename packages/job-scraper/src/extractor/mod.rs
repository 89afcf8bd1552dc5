//! Field extraction: turn one board page into raw listings.
//!
//! # Available Fetchers
//!
//! - `ScrapingBeeFetcher` - rendered fetch (JS enabled) with remote extraction
//! - `HtmlFetcher` - plain HTTP + local CSS extraction, for server-rendered boards
//! - `testing::MockFetcher` - canned listings and failures for tests
//!
//! A fetcher makes one attempt per call. Whether to try again is the
//! pipeline's decision.

mod html;
mod scrapingbee;

pub use html::{extract_from_html, HtmlFetcher};
pub use scrapingbee::{extract_request, ScrapingBeeFetcher};

use async_trait::async_trait;
use url::Url;

use crate::catalog::SourceDefinition;
use crate::error::FetchResult;
use crate::listing::RawListing;

#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetch the source page and extract one listing per container match.
    ///
    /// Fails as a whole for network, rendering, non-2xx, or unparseable
    /// responses. Missing fields inside a listing are empty, not errors.
    async fn fetch_listings(&self, source: &SourceDefinition) -> FetchResult<Vec<RawListing>>;

    /// Fetcher name for logging.
    fn name(&self) -> &str;
}

/// Trim every text field and make the link absolute against the page URL.
pub(crate) fn normalize_listing(mut listing: RawListing, base: Option<&Url>) -> RawListing {
    listing.title = collapse_whitespace(&listing.title);
    listing.company = collapse_whitespace(&listing.company);
    listing.location = collapse_whitespace(&listing.location);
    listing.salary = collapse_whitespace(&listing.salary);
    listing.description = collapse_whitespace(&listing.description);
    listing.source_url = resolve_link(base, &listing.source_url);
    listing.company_logo = listing
        .company_logo
        .map(|logo| resolve_link(base, &logo))
        .filter(|logo| !logo.is_empty());
    listing.tags = listing
        .tags
        .iter()
        .map(|tag| collapse_whitespace(tag))
        .filter(|tag| !tag.is_empty())
        .collect();
    listing.listed_type = collapse_whitespace(&listing.listed_type);
    listing.listed_treatments = listing
        .listed_treatments
        .iter()
        .map(|t| collapse_whitespace(t))
        .filter(|t| !t.is_empty())
        .collect();
    listing
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Relative hrefs are joined onto `base`; anything unparseable is kept as-is.
pub(crate) fn resolve_link(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}
