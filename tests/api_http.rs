// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, backed by
// a fixture-mode provider so no network is involved.
//
// Covered:
// - GET /health
// - GET /{ticker}        (demo ingestion + canned questions)
// - POST /followup/{ticker}
// - GET /analyze/{ticker} (unknown ticker -> 404)

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use ticker_intel::api::{self, AppState};
use ticker_intel::config::AnalysisConfig;
use ticker_intel::embed::HashEmbedder;
use ticker_intel::market::providers::yahoo::YahooFinanceProvider;
use ticker_intel::session::Session;
use ticker_intel::store::VectorStore;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, with fixture payloads.
fn test_router() -> Router {
    let provider = Arc::new(YahooFinanceProvider::from_fixtures(
        include_str!("fixtures/quote_aapl.json"),
        include_str!("fixtures/news_aapl.xml"),
        include_str!("fixtures/indices.json"),
    ));
    let store = Arc::new(VectorStore::new(Arc::new(HashEmbedder::new())));
    let session = Arc::new(Session::new(provider, store));
    api::router(AppState {
        session,
        analysis: Arc::new(AnalysisConfig::default()),
    })
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_ticker_demo_returns_one_answer_per_question() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/AAPL")
        .body(Body::empty())
        .expect("build GET /AAPL");

    let resp = app.oneshot(req).await.expect("oneshot /AAPL");
    assert!(
        resp.status().is_success(),
        "GET /AAPL should be 2xx, got {}",
        resp.status()
    );

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse demo json");
    let answers = v.as_array().expect("demo response must be an array");
    assert_eq!(answers.len(), 4, "one answer per demo question");

    let first = answers[0].as_str().expect("answer is a string");
    assert!(first.contains("Apple Inc."), "price answer: {first}");
    assert!(first.contains("Based on"), "source count suffix: {first}");
}

#[tokio::test]
async fn api_followup_answers_scoped_question() {
    let app = test_router();

    let payload = json!({ "query": "What is the current stock price?" });
    let req = Request::builder()
        .method("POST")
        .uri("/followup/AAPL")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /followup/AAPL");

    let resp = app.oneshot(req).await.expect("oneshot /followup");
    assert!(
        resp.status().is_success(),
        "POST /followup should be 2xx, got {}",
        resp.status()
    );

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse followup json");

    let answer = v["answer"].as_str().expect("missing 'answer'");
    assert!(answer.contains("Apple Inc."), "answer: {answer}");
    assert!(answer.contains("$150.00"));
    assert!(v["sources"].as_u64().expect("missing 'sources'") >= 1);
}

#[tokio::test]
async fn api_followup_reingest_is_a_noop() {
    let app = test_router();

    let payload = json!({ "query": "What is the current stock price?" }).to_string();
    let mut sources_seen = Vec::new();
    for _ in 0..2 {
        let req = Request::builder()
            .method("POST")
            .uri("/followup/AAPL")
            .header("content-type", "application/json")
            .body(Body::from(payload.clone()))
            .expect("build POST /followup/AAPL");
        let resp = app.clone().oneshot(req).await.expect("oneshot /followup");
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
            .await
            .expect("read json")
            .to_vec();
        let v: Json = serde_json::from_slice(&bytes).expect("parse followup json");
        sources_seen.push(v["sources"].as_u64().unwrap());
    }
    // The second call skips ingestion, so the source count must not grow.
    assert_eq!(sources_seen[0], sources_seen[1]);
}

#[tokio::test]
async fn api_analyze_unknown_ticker_is_404() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/analyze/ZZZ")
        .body(Body::empty())
        .expect("build GET /analyze/ZZZ");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
