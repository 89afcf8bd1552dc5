//! Rendered-page extraction through ScrapingBee.
//!
//! The selector set is sent as `extract_rules`; ScrapingBee runs the page's
//! JavaScript and returns `{ "jobs": [ {title, company, ...}, ... ] }`.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use scrapingbee_client::{ExtractRequest, ExtractRule, ScrapingBeeClient, SecretString};

use super::{normalize_listing, ListingFetcher};
use crate::catalog::SourceDefinition;
use crate::error::{FetchError, FetchResult};
use crate::listing::RawListing;

const LIST_KEY: &str = "jobs";

#[derive(Deserialize)]
struct ExtractedJobs {
    jobs: Option<Vec<RawListing>>,
}

pub struct ScrapingBeeFetcher {
    client: ScrapingBeeClient,
}

impl ScrapingBeeFetcher {
    pub fn new(api_key: impl Into<SecretString>, timeout: Duration) -> Self {
        Self {
            client: ScrapingBeeClient::new(api_key).with_timeout(timeout),
        }
    }

    pub fn with_client(client: ScrapingBeeClient) -> Self {
        Self { client }
    }
}

/// Build the extraction request for one source.
pub fn extract_request(source: &SourceDefinition) -> ExtractRequest {
    let selectors = &source.selectors;
    let mut fields = BTreeMap::new();

    for (key, selector) in [
        ("title", &selectors.title),
        ("company", &selectors.company),
        ("location", &selectors.location),
        ("salary", &selectors.salary),
        ("description", &selectors.description),
    ] {
        if !selector.trim().is_empty() {
            fields.insert(key.to_string(), ExtractRule::text(selector.as_str()));
        }
    }
    if !selectors.link.trim().is_empty() {
        fields.insert(
            "source_url".to_string(),
            ExtractRule::attribute(selectors.link.as_str(), "href"),
        );
    }
    if let Some(logo) = selectors.company_logo.as_deref().filter(|s| !s.trim().is_empty()) {
        fields.insert(
            "company_logo".to_string(),
            ExtractRule::attribute(logo, "src"),
        );
    }
    if let Some(tags) = selectors.tags.as_deref().filter(|s| !s.trim().is_empty()) {
        fields.insert("tags".to_string(), ExtractRule::text_list(tags));
    }
    if let Some(job_type) = selectors.job_type.as_deref().filter(|s| !s.trim().is_empty()) {
        fields.insert("listed_type".to_string(), ExtractRule::text(job_type));
    }
    if let Some(treatments) = selectors.treatments.as_deref().filter(|s| !s.trim().is_empty()) {
        fields.insert(
            "listed_treatments".to_string(),
            ExtractRule::text_list(treatments),
        );
    }

    ExtractRequest::new(source.url.as_str())
        .with_render_js(true)
        .with_block_resources(false)
        .with_rule(
            LIST_KEY,
            ExtractRule::object_list(selectors.container.as_str(), fields),
        )
}

#[async_trait]
impl ListingFetcher for ScrapingBeeFetcher {
    async fn fetch_listings(&self, source: &SourceDefinition) -> FetchResult<Vec<RawListing>> {
        tracing::info!(source = %source.name, url = %source.url, "Scraping jobs");

        let base = url::Url::parse(&source.url).map_err(|_| FetchError::InvalidUrl {
            url: source.url.clone(),
        })?;

        let response: ExtractedJobs = self.client.extract(&extract_request(source)).await?;
        let jobs = response
            .jobs
            .ok_or_else(|| FetchError::Parse(format!("response has no `{}` list", LIST_KEY)))?;

        Ok(jobs
            .into_iter()
            .map(|job| normalize_listing(job, Some(&base)))
            .collect())
    }

    fn name(&self) -> &str {
        "scrapingbee"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SiteCatalog;
    use scrapingbee_client::{RuleKind, RuleOutput};

    #[test]
    fn test_extract_request_maps_selector_set() {
        let catalog = SiteCatalog::builtin();
        let indeed = catalog.get("Indeed").unwrap();

        let request = extract_request(indeed);

        assert!(request.render_js);
        assert!(!request.block_resources);
        assert_eq!(request.url, indeed.url);

        let ExtractRule::Detailed(list) = &request.rules[LIST_KEY] else {
            panic!("jobs rule should be detailed");
        };
        assert_eq!(list.selector, ".job_seen_beacon");
        assert_eq!(list.kind, Some(RuleKind::List));

        let Some(RuleOutput::Fields(fields)) = &list.output else {
            panic!("jobs rule should have field output");
        };
        assert_eq!(fields["title"], ExtractRule::text(".jobTitle"));
        assert_eq!(
            fields["source_url"],
            ExtractRule::attribute("h2.jobTitle a", "href")
        );
        assert!(!fields.contains_key("company_logo"));
        assert!(!fields.contains_key("tags"));
        assert!(!fields.contains_key("listed_type"));
    }

    #[test]
    fn test_extract_request_includes_optional_fields() {
        let mut source = SiteCatalog::builtin().sources()[1].clone();
        source.selectors.company_logo = Some("img.company-logo".into());
        source.selectors.tags = Some(".tags span".into());
        source.selectors.job_type = Some(".job-type".into());
        source.selectors.treatments = Some(".treatments span".into());
        source.selectors.salary = String::new();

        let request = extract_request(&source);
        let ExtractRule::Detailed(list) = &request.rules[LIST_KEY] else {
            panic!("jobs rule should be detailed");
        };
        let Some(RuleOutput::Fields(fields)) = &list.output else {
            panic!("jobs rule should have field output");
        };

        assert_eq!(
            fields["company_logo"],
            ExtractRule::attribute("img.company-logo", "src")
        );
        assert_eq!(fields["tags"], ExtractRule::text_list(".tags span"));
        assert_eq!(fields["listed_type"], ExtractRule::text(".job-type"));
        assert_eq!(
            fields["listed_treatments"],
            ExtractRule::text_list(".treatments span")
        );
        assert!(!fields.contains_key("salary"));
    }

    #[test]
    fn test_extracted_jobs_missing_list_is_none() {
        let parsed: ExtractedJobs = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(parsed.jobs.is_none());

        let parsed: ExtractedJobs =
            serde_json::from_str(r#"{"jobs":[{"title":"A","source_url":"/a"}]}"#).unwrap();
        assert_eq!(parsed.jobs.unwrap().len(), 1);
    }
}
