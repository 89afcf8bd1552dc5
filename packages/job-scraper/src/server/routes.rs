use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::pipeline::SourceResult;
use crate::server::app::AppState;

/// Optional request body restricting a run to some sources.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub results: Vec<SourceResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(error: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Run the scraper and return per-source results.
///
/// 200 with `{ results }` whenever the run completes, even if every source
/// failed. 400 with `{ error }` when the run could not start.
pub async fn scrape_jobs_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RunRequest::default()
    } else {
        match serde_json::from_slice::<RunRequest>(&body) {
            Ok(request) => request,
            Err(e) => return bad_request(format!("Invalid request body: {}", e)),
        }
    };

    match state.try_run(&request.sources).await {
        Ok(report) => (
            StatusCode::OK,
            Json(RunResponse {
                results: report.results(),
            }),
        )
            .into_response(),
        Err(refused) => {
            tracing::warn!(error = %refused, "Scrape run refused");
            bad_request(refused.to_string())
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    sources: usize,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sources: state.catalog.len(),
    })
}
