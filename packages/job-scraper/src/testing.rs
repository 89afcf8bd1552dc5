//! Mock implementations for testing.
//!
//! `MockFetcher` returns canned listings per source name and can fail a
//! source permanently or for its first N calls. Pair it with
//! `store::MemoryJobStore` to run the whole pipeline without network or
//! database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::catalog::{SelectorSet, SourceDefinition};
use crate::error::{FetchError, FetchResult};
use crate::extractor::ListingFetcher;
use crate::listing::RawListing;

#[derive(Debug, Clone)]
struct ScriptedFailure {
    message: String,
    /// `None` fails forever
    remaining: Option<usize>,
}

#[derive(Default, Clone)]
pub struct MockFetcher {
    listings: Arc<RwLock<HashMap<String, Vec<RawListing>>>>,
    failures: Arc<RwLock<HashMap<String, ScriptedFailure>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listings returned for `source` on every successful call.
    pub fn with_listings(self, source: &str, listings: Vec<RawListing>) -> Self {
        self.set_listings(source, listings);
        self
    }

    /// Every fetch of `source` fails with a transport error.
    pub fn with_failure(self, source: &str, message: &str) -> Self {
        self.failures.write().unwrap().insert(
            source.to_string(),
            ScriptedFailure {
                message: message.to_string(),
                remaining: None,
            },
        );
        self
    }

    /// The first `times` fetches of `source` fail, later ones succeed.
    pub fn with_transient_failure(self, source: &str, message: &str, times: usize) -> Self {
        self.failures.write().unwrap().insert(
            source.to_string(),
            ScriptedFailure {
                message: message.to_string(),
                remaining: Some(times),
            },
        );
        self
    }

    /// Replace the page content for `source` (e.g. between runs).
    pub fn set_listings(&self, source: &str, listings: Vec<RawListing>) {
        self.listings
            .write()
            .unwrap()
            .insert(source.to_string(), listings);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self, source: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == source)
            .count()
    }
}

#[async_trait]
impl ListingFetcher for MockFetcher {
    async fn fetch_listings(&self, source: &SourceDefinition) -> FetchResult<Vec<RawListing>> {
        self.calls.write().unwrap().push(source.name.clone());

        if let Some(failure) = self.failures.write().unwrap().get_mut(&source.name) {
            match failure.remaining.as_mut() {
                None => return Err(FetchError::Transport(failure.message.clone())),
                Some(n) if *n > 0 => {
                    *n -= 1;
                    return Err(FetchError::Transport(failure.message.clone()));
                }
                Some(_) => {}
            }
        }

        Ok(self
            .listings
            .read()
            .unwrap()
            .get(&source.name)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A listing with a link and description; other fields filled with placeholders.
pub fn raw_listing(source_url: &str, description: &str) -> RawListing {
    RawListing::new("Aesthetic Nurse Injector", source_url)
        .with_company("Test Med Spa")
        .with_location("Austin, TX")
        .with_description(description)
}

/// A catalog entry pointing at `https://<name>.example/jobs`.
pub fn test_source(name: &str) -> SourceDefinition {
    SourceDefinition::new(
        name,
        format!("https://{}.example/jobs", name.to_lowercase()),
        SelectorSet {
            container: ".job".into(),
            title: ".title".into(),
            link: "a".into(),
            ..Default::default()
        },
    )
}
