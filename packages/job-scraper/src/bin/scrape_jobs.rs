// One-shot scrape of every catalog source.
//
// Exits 0 once all sources have been attempted, whatever their outcome.
// Exits non-zero only when startup fails (configuration, database).

use anyhow::{Context, Result};
use job_scraper::{startup, Config};

#[tokio::main]
async fn main() -> Result<()> {
    startup::init_tracing();

    tracing::info!("Starting job scraping script...");

    let config = Config::from_env().context("Failed to load configuration")?;
    let (pipeline, catalog) = startup::build_pipeline(&config).await?;

    let report = pipeline.run(catalog.sources()).await;

    for source in &report.sources {
        match &source.error {
            None => println!(
                "{}: {} new jobs ({} found, {} already imported)",
                source.source, source.imported, source.found, source.duplicates
            ),
            Some(e) => println!("{}: failed - {}", source.source, e),
        }
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Job scraping completed successfully"
    );
    Ok(())
}
