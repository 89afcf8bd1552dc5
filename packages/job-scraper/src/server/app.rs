//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    http::{HeaderName, Method},
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::SiteCatalog;
use crate::pipeline::{Pipeline, RunReport};
use crate::server::routes::{health_handler, scrape_jobs_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub catalog: Arc<SiteCatalog>,
    /// Held for the duration of a run; overlapping runs are refused
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, catalog: SiteCatalog) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            catalog: Arc::new(catalog),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run the named sources (all when empty) unless a run is in progress.
    pub async fn try_run(&self, names: &[String]) -> Result<RunReport, RunRefused> {
        let selected;
        let sources = if names.is_empty() {
            self.catalog.sources()
        } else {
            selected = self.catalog.select(names).map_err(RunRefused::UnknownSource)?;
            selected.as_slice()
        };

        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| RunRefused::AlreadyRunning)?;

        Ok(self.pipeline.run(sources).await)
    }
}

/// Reasons a run is refused before any source is touched.
#[derive(Debug, thiserror::Error)]
pub enum RunRefused {
    #[error("{0}")]
    UnknownSource(String),

    #[error("A scrape run is already in progress")]
    AlreadyRunning,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // Browser clients call this directly; allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ]);

    Router::new()
        .route("/scrape-jobs", post(scrape_jobs_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::pipeline::PipelineConfig;
    use crate::store::MemoryJobStore;
    use crate::testing::{test_source, MockFetcher};
    use std::time::Duration;

    fn state(fetcher: MockFetcher) -> AppState {
        let pipeline = Pipeline::new(
            Arc::new(fetcher),
            Arc::new(MemoryJobStore::new()),
            Arc::new(Classifier::builtin()),
            PipelineConfig {
                pacing_delay: Duration::ZERO,
                fetch_retries: 0,
            },
        );
        let catalog = SiteCatalog::new(vec![test_source("A"), test_source("B")]).unwrap();
        AppState::new(pipeline, catalog)
    }

    #[tokio::test]
    async fn test_try_run_without_names_runs_whole_catalog() {
        let fetcher = MockFetcher::new();
        let report = state(fetcher.clone()).try_run(&[]).await.unwrap();

        assert_eq!(report.sources.len(), 2);
        assert_eq!(fetcher.calls(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_try_run_with_names_runs_selection() {
        let fetcher = MockFetcher::new();
        let report = state(fetcher.clone())
            .try_run(&["B".to_string()])
            .await
            .unwrap();

        assert_eq!(report.sources.len(), 1);
        assert_eq!(fetcher.calls(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_try_run_unknown_name_is_refused() {
        let err = state(MockFetcher::new())
            .try_run(&["Z".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, RunRefused::UnknownSource(_)));
    }
}
