//! Local CSS extraction for boards that render listings server-side.
//!
//! Limitations:
//! - No JavaScript rendering (client-rendered boards return zero listings)

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

use super::{collapse_whitespace, normalize_listing, ListingFetcher};
use crate::catalog::SourceDefinition;
use crate::error::{FetchError, FetchResult};
use crate::listing::RawListing;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct HtmlFetcher {
    client: reqwest::Client,
}

impl HtmlFetcher {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> FetchResult<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ListingFetcher for HtmlFetcher {
    async fn fetch_listings(&self, source: &SourceDefinition) -> FetchResult<Vec<RawListing>> {
        tracing::info!(source = %source.name, url = %source.url, "Fetching board HTML");
        let html = self.fetch_html(&source.url).await?;
        extract_from_html(&html, source)
    }

    fn name(&self) -> &str {
        "html"
    }
}

/// Parsed form of a selector; `None` means the field was left empty.
fn compile(selector: &str) -> FetchResult<Option<Selector>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(None);
    }
    Selector::parse(selector)
        .map(Some)
        .map_err(|e| FetchError::Selector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
}

fn first_text(container: &ElementRef<'_>, selector: &Option<Selector>) -> String {
    selector
        .as_ref()
        .and_then(|sel| container.select(sel).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn first_attr(container: &ElementRef<'_>, selector: &Option<Selector>, attr: &str) -> Option<String> {
    selector
        .as_ref()
        .and_then(|sel| container.select(sel).next())
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.to_string())
}

fn all_text(container: &ElementRef<'_>, selector: &Option<Selector>) -> Vec<String> {
    selector
        .as_ref()
        .map(|sel| {
            container
                .select(sel)
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .collect()
        })
        .unwrap_or_default()
}

/// Apply a source's selector set to an HTML document.
///
/// One listing per `container` match, in document order.
pub fn extract_from_html(html: &str, source: &SourceDefinition) -> FetchResult<Vec<RawListing>> {
    let selectors = &source.selectors;
    let base = Url::parse(&source.url).map_err(|_| FetchError::InvalidUrl {
        url: source.url.clone(),
    })?;

    let container = compile(&selectors.container)?.ok_or_else(|| FetchError::Selector {
        selector: String::new(),
        reason: "container selector is empty".into(),
    })?;
    let title = compile(&selectors.title)?;
    let company = compile(&selectors.company)?;
    let location = compile(&selectors.location)?;
    let salary = compile(&selectors.salary)?;
    let description = compile(&selectors.description)?;
    let link = compile(&selectors.link)?;
    let logo = compile(selectors.company_logo.as_deref().unwrap_or_default())?;
    let tags = compile(selectors.tags.as_deref().unwrap_or_default())?;
    let listed_type = compile(selectors.job_type.as_deref().unwrap_or_default())?;
    let listed_treatments = compile(selectors.treatments.as_deref().unwrap_or_default())?;

    let document = Html::parse_document(html);

    let listings = document
        .select(&container)
        .map(|el| {
            let raw = RawListing {
                title: first_text(&el, &title),
                company: first_text(&el, &company),
                location: first_text(&el, &location),
                salary: first_text(&el, &salary),
                description: first_text(&el, &description),
                source_url: first_attr(&el, &link, "href").unwrap_or_default(),
                company_logo: first_attr(&el, &logo, "src"),
                tags: all_text(&el, &tags),
                listed_type: first_text(&el, &listed_type),
                listed_treatments: all_text(&el, &listed_treatments),
            };
            normalize_listing(raw, Some(&base))
        })
        .collect();

    Ok(listings)
}
