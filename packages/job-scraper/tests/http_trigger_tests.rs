//! HTTP trigger: request handling, response shapes, CORS, overlap guard.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use job_scraper::server::{build_app, AppState};
use job_scraper::testing::{raw_listing, test_source, MockFetcher};
use job_scraper::{Classifier, MemoryJobStore, Pipeline, PipelineConfig, SiteCatalog};

fn test_state(fetcher: MockFetcher, store: Arc<MemoryJobStore>) -> AppState {
    let pipeline = Pipeline::new(
        Arc::new(fetcher),
        store,
        Arc::new(Classifier::builtin()),
        PipelineConfig {
            pacing_delay: Duration::ZERO,
            fetch_retries: 0,
        },
    );
    let catalog = SiteCatalog::new(vec![test_source("A"), test_source("B")]).unwrap();
    AppState::new(pipeline, catalog)
}

fn scrape_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/scrape-jobs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_run_returns_per_source_results() {
    let fetcher = MockFetcher::new()
        .with_listings(
            "A",
            vec![
                raw_listing("https://a.example/jobs/1", ""),
                raw_listing("https://a.example/jobs/2", ""),
            ],
        )
        .with_failure("B", "connection refused");
    let store = Arc::new(MemoryJobStore::new());
    let app = build_app(test_state(fetcher, store.clone()));

    let response = app.oneshot(scrape_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "results": [
                { "source": "A", "jobsFound": 2, "status": "success" },
                {
                    "source": "B",
                    "error": "fetch failed: transport error: connection refused",
                    "status": "error"
                }
            ]
        })
    );
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_body_restricts_sources() {
    let fetcher = MockFetcher::new()
        .with_listings("A", vec![raw_listing("https://a.example/jobs/1", "")])
        .with_listings("B", vec![raw_listing("https://b.example/jobs/1", "")]);
    let app = build_app(test_state(fetcher.clone(), Arc::new(MemoryJobStore::new())));

    let response = app
        .oneshot(scrape_request(r#"{"sources":["B"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["source"], "B");
    assert_eq!(fetcher.calls(), vec!["B"]);
}

#[tokio::test]
async fn test_unknown_source_is_bad_request() {
    let fetcher = MockFetcher::new();
    let app = build_app(test_state(fetcher.clone(), Arc::new(MemoryJobStore::new())));

    let response = app
        .oneshot(scrape_request(r#"{"sources":["Monster"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Unknown source: Monster" }));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = build_app(test_state(MockFetcher::new(), Arc::new(MemoryJobStore::new())));

    let response = app.oneshot(scrape_request("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_overlapping_run_is_refused() {
    let fetcher = MockFetcher::new();
    let state = test_state(fetcher.clone(), Arc::new(MemoryJobStore::new()));
    let _running = state.run_lock.clone().try_lock_owned().unwrap();
    let app = build_app(state);

    let response = app.oneshot(scrape_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "A scrape run is already in progress" })
    );
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_preflight_allows_any_origin() {
    let app = build_app(test_state(MockFetcher::new(), Arc::new(MemoryJobStore::new())));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/scrape-jobs")
        .header(header::ORIGIN, "https://app.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "apikey,content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("apikey"));
    assert!(allowed.contains("x-client-info"));
}

#[tokio::test]
async fn test_health() {
    let app = build_app(test_state(MockFetcher::new(), Arc::new(MemoryJobStore::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok", "sources": 2 }));
}
