//! stream.rs — Standalone streaming ingestion loops.
//!
//! Two spawned tasks: a price loop appending `prices.csv` rows per ticker,
//! and a slower indicator loop combining provider fundamentals with
//! SMA-50/RSI-14 computed from the prices persisted so far. The loops have
//! no coordination with the query side; they only write per-ticker files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;

use crate::config::UniverseConfig;
use crate::history::{self, IndicatorRow, PriceRow};
use crate::indicators;
use crate::market::types::MarketDataProvider;

const SMA_WINDOW: usize = 50;
const RSI_LENGTH: usize = 14;

#[derive(Debug, Clone)]
pub struct StreamCfg {
    pub tickers: Vec<String>,
    pub price_interval: Duration,
    pub indicator_interval: Duration,
    pub data_dir: PathBuf,
}

impl StreamCfg {
    pub fn from_universe(cfg: &UniverseConfig) -> Self {
        Self {
            tickers: cfg.tickers.clone(),
            price_interval: Duration::from_secs(cfg.poll_price_secs),
            indicator_interval: Duration::from_secs(cfg.poll_indicator_secs),
            data_dir: cfg.data_dir.clone(),
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("stream_price_rows_total", "Price rows persisted to CSV.");
        describe_counter!(
            "stream_indicator_rows_total",
            "Indicator rows persisted to CSV."
        );
    });
}

/// Poll quotes on a fixed cadence and append one CSV row per ticker.
pub fn spawn_price_stream(
    provider: Arc<dyn MarketDataProvider>,
    cfg: StreamCfg,
) -> JoinHandle<()> {
    ensure_metrics_described();
    tokio::spawn(async move {
        let mut ticker_timer = tokio::time::interval(cfg.price_interval);
        loop {
            ticker_timer.tick().await;
            for symbol in &cfg.tickers {
                match provider.quote(symbol).await {
                    Ok(Some(q)) => {
                        let row = PriceRow {
                            ts: q.observed_at,
                            price: q.current_price,
                            volume: q.volume,
                        };
                        if let Err(e) = history::append_price(&cfg.data_dir, symbol, &row) {
                            tracing::warn!(error = ?e, ticker = %symbol, "price persist failed");
                            continue;
                        }
                        counter!("stream_price_rows_total").increment(1);
                        tracing::info!(
                            target: "stream",
                            ticker = %symbol,
                            price = row.price,
                            volume = row.volume,
                            "price tick"
                        );
                    }
                    Ok(None) => {
                        tracing::warn!(ticker = %symbol, "no quote data");
                    }
                    Err(e) => {
                        tracing::warn!(error = ?e, ticker = %symbol, "quote fetch failed");
                        counter!("fetch_provider_errors_total").increment(1);
                    }
                }
            }
        }
    })
}

/// Poll fundamentals on a slower cadence, derive SMA-50/RSI-14 from the
/// streamed prices, and append one indicator row per ticker. Fields stay
/// blank until enough history has accumulated.
pub fn spawn_indicator_stream(
    provider: Arc<dyn MarketDataProvider>,
    cfg: StreamCfg,
) -> JoinHandle<()> {
    ensure_metrics_described();
    tokio::spawn(async move {
        let mut ticker_timer = tokio::time::interval(cfg.indicator_interval);
        loop {
            ticker_timer.tick().await;
            for symbol in &cfg.tickers {
                let fundamentals = match provider.fundamentals(symbol).await {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::warn!(error = ?e, ticker = %symbol, "fundamentals fetch failed");
                        counter!("fetch_provider_errors_total").increment(1);
                        Default::default()
                    }
                };
                let closes = match history::load_streamed_prices(&cfg.data_dir, symbol) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(error = ?e, ticker = %symbol, "price read failed");
                        Vec::new()
                    }
                };

                let row = IndicatorRow {
                    ts: Utc::now(),
                    pe: fundamentals.pe,
                    eps: fundamentals.eps,
                    sma50: indicators::sma(&closes, SMA_WINDOW),
                    rsi14: indicators::rsi(&closes, RSI_LENGTH),
                };
                if let Err(e) = history::append_indicators(&cfg.data_dir, symbol, &row) {
                    tracing::warn!(error = ?e, ticker = %symbol, "indicator persist failed");
                    continue;
                }
                counter!("stream_indicator_rows_total").increment(1);
                tracing::info!(
                    target: "stream",
                    ticker = %symbol,
                    pe = ?row.pe,
                    sma50 = ?row.sma50,
                    rsi14 = ?row.rsi14,
                    "indicator tick"
                );
            }
        }
    })
}
