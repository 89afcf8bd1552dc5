//! Pipeline orchestrator.
//!
//! ```text
//! run(sources)
//!     │
//!     └─► for each source, in catalog order:
//!             Fetching → Classifying → Deduplicating → Importing → Done
//!             (any stage error ends this source only)
//!             sleep(pacing_delay)
//! ```
//!
//! Sources run one at a time. A failed source becomes an error entry in the
//! report; the run itself always completes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::catalog::SourceDefinition;
use crate::classifier::Classifier;
use crate::dedup::deduplicate;
use crate::error::{FetchError, ScrapeError};
use crate::extractor::ListingFetcher;
use crate::importer::import;
use crate::listing::RawListing;
use crate::store::JobStore;

pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sleep after every source, success or failure
    pub pacing_delay: Duration,
    /// Extra fetch attempts after the first failure
    pub fetch_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_delay: DEFAULT_PACING_DELAY,
            fetch_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Classifying,
    Deduplicating,
    Importing,
    Done,
}

/// What happened to one source.
#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    /// Last stage entered; `Done` on success
    pub stage: Stage,
    pub found: usize,
    pub duplicates: usize,
    pub unkeyed: usize,
    pub imported: usize,
    pub error: Option<ScrapeError>,
}

impl SourceReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            stage: Stage::Fetching,
            found: 0,
            duplicates: 0,
            unkeyed: 0,
            imported: 0,
            error: None,
        }
    }

    fn fail(mut self, error: ScrapeError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn result(&self) -> SourceResult {
        match &self.error {
            None => SourceResult {
                source: self.source.clone(),
                jobs_found: Some(self.imported),
                error: None,
                status: SourceStatus::Success,
            },
            Some(error) => SourceResult {
                source: self.source.clone(),
                jobs_found: None,
                error: Some(error.to_string()),
                status: SourceStatus::Error,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Success,
    Error,
}

/// Wire form of a source outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceResult {
    pub source: String,
    #[serde(rename = "jobsFound", skip_serializing_if = "Option::is_none")]
    pub jobs_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: SourceStatus,
}

#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn results(&self) -> Vec<SourceResult> {
        self.sources.iter().map(SourceReport::result).collect()
    }

    pub fn succeeded(&self) -> usize {
        self.sources.iter().filter(|s| s.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.sources.len() - self.succeeded()
    }

    pub fn imported(&self) -> usize {
        self.sources.iter().map(|s| s.imported).sum()
    }
}

pub struct Pipeline {
    fetcher: Arc<dyn ListingFetcher>,
    store: Arc<dyn JobStore>,
    classifier: Arc<Classifier>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ListingFetcher>,
        store: Arc<dyn JobStore>,
        classifier: Arc<Classifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every source in order. Never fails as a whole.
    pub async fn run(&self, sources: &[SourceDefinition]) -> RunReport {
        let started_at = Utc::now();
        tracing::info!(
            sources = sources.len(),
            fetcher = self.fetcher.name(),
            "Starting job scraping"
        );

        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            let span = tracing::info_span!("scrape_source", source = %source.name);
            let report = self.run_source(source).instrument(span).await;

            match &report.error {
                None => tracing::info!(
                    source = %report.source,
                    found = report.found,
                    duplicates = report.duplicates,
                    imported = report.imported,
                    "Source processed"
                ),
                Some(e) => tracing::error!(
                    source = %report.source,
                    stage = ?report.stage,
                    error = %e,
                    "Error processing source"
                ),
            }
            reports.push(report);

            if !self.config.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.pacing_delay).await;
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            sources: reports,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            imported = report.imported(),
            "Job scraping completed"
        );
        report
    }

    /// One source through all four stages.
    pub async fn run_source(&self, source: &SourceDefinition) -> SourceReport {
        let mut report = SourceReport::new(&source.name);

        let raw = match self.fetch_with_retries(source).await {
            Ok(raw) => raw,
            Err(e) => return report.fail(ScrapeError::SourceFetch(e)),
        };
        report.found = raw.len();

        report.stage = Stage::Classifying;
        let now = Utc::now();
        let classified: Vec<_> = raw
            .into_iter()
            .map(|listing| self.classifier.classify_listing(listing, now))
            .collect();

        report.stage = Stage::Deduplicating;
        let deduped = match deduplicate(self.store.as_ref(), classified).await {
            Ok(outcome) => outcome,
            Err(e) => return report.fail(ScrapeError::DedupQuery(e)),
        };
        report.duplicates = deduped.duplicates;
        report.unkeyed = deduped.unkeyed;
        if deduped.unkeyed > 0 {
            tracing::warn!(count = deduped.unkeyed, "Skipped listings without a link");
        }

        report.stage = Stage::Importing;
        match import(self.store.as_ref(), &deduped.fresh).await {
            Ok(outcome) => {
                report.imported = outcome.imported();
                report.duplicates += outcome.conflicts;
            }
            Err(e) => return report.fail(ScrapeError::ImportWrite(e)),
        }

        report.stage = Stage::Done;
        report
    }

    async fn fetch_with_retries(&self, source: &SourceDefinition) -> Result<Vec<RawListing>, FetchError> {
        let attempts = self.config.fetch_retries + 1;
        let mut attempt = 1;
        loop {
            match self.fetcher.fetch_listings(source).await {
                Ok(listings) => {
                    tracing::debug!(count = listings.len(), attempt, "Fetched listings");
                    return Ok(listings);
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(attempt, attempts, error = %e, "Fetch failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SiteCatalog;
    use crate::store::MemoryJobStore;
    use crate::testing::{raw_listing, MockFetcher};

    fn pipeline(fetcher: MockFetcher, store: Arc<MemoryJobStore>, retries: u32) -> Pipeline {
        Pipeline::new(
            Arc::new(fetcher),
            store,
            Arc::new(Classifier::builtin()),
            PipelineConfig {
                pacing_delay: Duration::ZERO,
                fetch_retries: retries,
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_fetching_stage() {
        let catalog = SiteCatalog::builtin();
        let fetcher = MockFetcher::new().with_failure("Indeed", "connection reset");
        let store = Arc::new(MemoryJobStore::new());

        let report = pipeline(fetcher, store, 0)
            .run_source(catalog.get("Indeed").unwrap())
            .await;

        assert_eq!(report.stage, Stage::Fetching);
        assert!(matches!(report.error, Some(ScrapeError::SourceFetch(_))));
    }

    #[tokio::test]
    async fn test_dedup_failure_reports_deduplicating_stage() {
        let catalog = SiteCatalog::builtin();
        let fetcher = MockFetcher::new()
            .with_listings("Indeed", vec![raw_listing("https://www.indeed.com/1", "")]);
        let store = Arc::new(MemoryJobStore::new());
        store.set_query_failure(true);

        let report = pipeline(fetcher, store.clone(), 0)
            .run_source(catalog.get("Indeed").unwrap())
            .await;

        assert_eq!(report.stage, Stage::Deduplicating);
        assert!(matches!(report.error, Some(ScrapeError::DedupQuery(_))));
        assert_eq!(store.write_call_count(), 0);
    }

    #[tokio::test]
    async fn test_import_failure_reports_importing_stage() {
        let catalog = SiteCatalog::builtin();
        let fetcher = MockFetcher::new()
            .with_listings("Indeed", vec![raw_listing("https://www.indeed.com/1", "")]);
        let store = Arc::new(MemoryJobStore::new());
        store.set_write_failure(true);

        let report = pipeline(fetcher, store.clone(), 0)
            .run_source(catalog.get("Indeed").unwrap())
            .await;

        assert_eq!(report.stage, Stage::Importing);
        assert!(matches!(report.error, Some(ScrapeError::ImportWrite(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_retries_transient_fetch_failure() {
        let catalog = SiteCatalog::builtin();
        let fetcher = MockFetcher::new()
            .with_transient_failure("Indeed", "timeout", 2)
            .with_listings("Indeed", vec![raw_listing("https://www.indeed.com/1", "")]);
        let store = Arc::new(MemoryJobStore::new());

        let report = pipeline(fetcher.clone(), store, 2)
            .run_source(catalog.get("Indeed").unwrap())
            .await;

        assert!(report.is_success());
        assert_eq!(report.imported, 1);
        assert_eq!(fetcher.call_count("Indeed"), 3);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let catalog = SiteCatalog::builtin();
        let fetcher = MockFetcher::new().with_transient_failure("Indeed", "timeout", 1);
        let store = Arc::new(MemoryJobStore::new());

        let report = pipeline(fetcher.clone(), store, 0)
            .run_source(catalog.get("Indeed").unwrap())
            .await;

        assert!(!report.is_success());
        assert_eq!(fetcher.call_count("Indeed"), 1);
    }

    #[test]
    fn test_result_serialization() {
        let mut ok = SourceReport::new("A");
        ok.imported = 2;
        ok.stage = Stage::Done;
        assert_eq!(
            serde_json::to_value(ok.result()).unwrap(),
            serde_json::json!({ "source": "A", "jobsFound": 2, "status": "success" })
        );

        let failed = SourceReport::new("B").fail(ScrapeError::SourceFetch(FetchError::Transport(
            "network down".into(),
        )));
        assert_eq!(
            serde_json::to_value(failed.result()).unwrap(),
            serde_json::json!({
                "source": "B",
                "error": "fetch failed: transport error: network down",
                "status": "error"
            })
        );
    }
}
