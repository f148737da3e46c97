//! Ticker Intelligence Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.
//!
//! See `README.md` for quickstart and endpoint descriptions.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticker_intel::api::{self, AppState};
use ticker_intel::config::AnalysisConfig;
use ticker_intel::embed::{HashEmbedder, TextEmbedder, EMBEDDING_DIM};
use ticker_intel::market::providers::yahoo::YahooFinanceProvider;
use ticker_intel::market::types::MarketDataProvider;
use ticker_intel::telemetry::Metrics;
use ticker_intel::session::Session;
use ticker_intel::store::VectorStore;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - INTEL_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("INTEL_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ticker_intel=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // UNIVERSE_CONFIG_PATH / ANALYSIS_CONFIG_PATH and the provider base-URL
    // overrides from .env.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let metrics = Metrics::init(EMBEDDING_DIM);

    let analysis = AnalysisConfig::load().expect("Failed to load analysis config");

    let embedder: Arc<dyn TextEmbedder> = Arc::new(HashEmbedder::new());
    let store = Arc::new(VectorStore::new(embedder));
    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceProvider::from_env());
    let session = Arc::new(Session::new(provider, store));

    let state = AppState {
        session,
        analysis: Arc::new(analysis),
    };
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
