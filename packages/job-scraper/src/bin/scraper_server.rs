// HTTP-triggered scraper with an optional cron schedule

use anyhow::{Context, Result};
use job_scraper::server::{build_app, AppState};
use job_scraper::{scheduled_tasks, startup, Config};

#[tokio::main]
async fn main() -> Result<()> {
    startup::init_tracing();

    tracing::info!("Starting job scraper server");

    let config = Config::from_env().context("Failed to load configuration")?;
    let (pipeline, catalog) = startup::build_pipeline(&config).await?;
    let state = AppState::new(pipeline, catalog);

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match &config.scrape_schedule {
        Some(schedule) => Some(
            scheduled_tasks::start_scheduler(state.clone(), schedule)
                .await
                .context("Failed to start scheduler")?,
        ),
        None => None,
    };

    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Trigger a run: POST http://localhost:{}/scrape-jobs", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
