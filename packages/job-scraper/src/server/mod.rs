//! HTTP trigger for scrape runs.

pub mod app;
pub mod routes;

pub use app::{build_app, AppState, RunRefused};
