//! Wiring: turn a `Config` into a ready pipeline.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::catalog::SiteCatalog;
use crate::config::{Config, FetchBackend};
use crate::extractor::{HtmlFetcher, ListingFetcher, ScrapingBeeFetcher};
use crate::pipeline::Pipeline;
use crate::store::PostgresJobStore;

/// Connect to the database, run migrations, and build the pipeline.
///
/// Catalog and classifier problems surface here, before any source is fetched.
pub async fn build_pipeline(config: &Config) -> Result<(Pipeline, SiteCatalog)> {
    let (catalog, classifier) = config
        .load_catalog()
        .context("Failed to load site catalog")?;
    tracing::info!(sources = catalog.len(), "Site catalog loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(config.database_url.expose())
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database ready");

    let fetcher: Arc<dyn ListingFetcher> = match config.fetch_backend {
        FetchBackend::ScrapingBee => Arc::new(ScrapingBeeFetcher::new(
            config.scrapingbee_api_key.clone(),
            config.fetch_timeout,
        )),
        FetchBackend::Html => Arc::new(
            HtmlFetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?,
        ),
    };
    tracing::info!(fetcher = fetcher.name(), "Fetcher ready");

    let pipeline = Pipeline::new(
        fetcher,
        Arc::new(PostgresJobStore::new(pool)),
        Arc::new(classifier),
        config.pipeline_config(),
    );

    Ok((pipeline, catalog))
}

/// Install the `tracing` subscriber used by the binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_scraper=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
