//! Standalone streaming ingestion: polls quotes and fundamentals for the
//! configured ticker universe and appends per-ticker CSV files under the
//! data directory. Runs until interrupted.

use std::sync::Arc;

use ticker_intel::config::UniverseConfig;
use ticker_intel::market::providers::yahoo::YahooFinanceProvider;
use ticker_intel::market::types::MarketDataProvider;
use ticker_intel::stream::{self, StreamCfg};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let universe = UniverseConfig::load()?;
    tracing::info!(
        tickers = ?universe.tickers,
        price_secs = universe.poll_price_secs,
        indicator_secs = universe.poll_indicator_secs,
        data_dir = %universe.data_dir.display(),
        "streaming ingestion starting"
    );

    let cfg = StreamCfg::from_universe(&universe);
    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceProvider::from_env());

    let prices = stream::spawn_price_stream(provider.clone(), cfg.clone());
    let indicators = stream::spawn_indicator_stream(provider, cfg);

    let _ = tokio::join!(prices, indicators);
    Ok(())
}
