// src/market/types.rs
use anyhow::Result;

use crate::record::{IndexSnapshot, NewsItem, Quote};

/// Trailing fundamentals consumed by the indicator stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fundamentals {
    pub pe: Option<f64>,
    pub eps: Option<f64>,
}

/// External market-data collaborator.
///
/// Implementations fetch and parse; "no data" outcomes are empty/absent
/// results, never errors. Callers decide whether a fetch error is fatal.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current snapshot for one ticker, `None` when the provider has no row
    /// (unknown symbol, missing price).
    async fn quote(&self, ticker: &str) -> Result<Option<Quote>>;

    /// Up to `limit` recent headlines for one ticker.
    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsItem>>;

    /// Snapshot of the tracked major indices; unavailable rows are skipped.
    async fn market_overview(&self) -> Result<Vec<IndexSnapshot>>;

    /// Trailing P/E and EPS for one ticker; fields absent when unknown.
    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals>;

    fn name(&self) -> &'static str;
}
