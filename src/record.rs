//! record.rs — The ingested fact types.
//!
//! Every piece of data the pipeline pulls in (a quote snapshot, a news item,
//! an index snapshot, an industry note) becomes one `Record`. The `kind` tag
//! travels with the record through the vector store so the answer composer
//! can dispatch on it later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of one listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub company_name: String,
    pub current_price: f64,
    /// Absolute change vs. the previous close.
    pub price_change: f64,
    /// Percent change vs. the previous close.
    pub percent_change: f64,
    pub volume: u64,
    pub sector: String,
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// One headline pulled from a per-ticker news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub ticker: String,
    pub title: String,
    pub summary: String,
    pub publisher: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

/// Market-wide index level; carries no ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub index_name: String,
    pub symbol: String,
    pub current_value: f64,
    pub change: f64,
    pub percent_change: f64,
    pub observed_at: DateTime<Utc>,
}

/// Free-text sector/industry context derived from a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryNote {
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub context: String,
    pub observed_at: DateTime<Utc>,
}

/// Tagged union over everything the pipeline can ingest.
///
/// Invariant: `ticker` is present for `Quote`/`News`/`Industry` and absent
/// for `Index` (market-wide).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Quote(Quote),
    News(NewsItem),
    Index(IndexSnapshot),
    Industry(IndustryNote),
}

impl Record {
    /// Variant tag, for logs and telemetry labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Quote(_) => "quote",
            Record::News(_) => "news",
            Record::Index(_) => "index",
            Record::Industry(_) => "industry",
        }
    }

    /// The owning ticker, `None` for market-wide records.
    pub fn ticker(&self) -> Option<&str> {
        match self {
            Record::Quote(q) => Some(&q.ticker),
            Record::News(n) => Some(&n.ticker),
            Record::Index(_) => None,
            Record::Industry(n) => Some(&n.ticker),
        }
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        match self {
            Record::Quote(q) => q.observed_at,
            Record::News(n) => n.observed_at,
            Record::Index(i) => i.observed_at,
            Record::Industry(n) => n.observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quote() -> Quote {
        Quote {
            ticker: "AAPL".into(),
            company_name: "Apple Inc.".into(),
            current_price: 150.0,
            price_change: 1.85,
            percent_change: 1.25,
            volume: 51_234_567,
            sector: "Technology".into(),
            industry: "Consumer Electronics".into(),
            market_cap: Some(2.4e12),
            pe_ratio: Some(28.4),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn kind_tag_serializes_with_the_record() {
        let rec = Record::Quote(sample_quote());
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["kind"], serde_json::json!("quote"));
        assert_eq!(v["ticker"], serde_json::json!("AAPL"));
    }

    #[test]
    fn index_records_are_market_wide() {
        let rec = Record::Index(IndexSnapshot {
            index_name: "S&P 500".into(),
            symbol: "^GSPC".into(),
            current_value: 6400.21,
            change: 28.66,
            percent_change: 0.45,
            observed_at: Utc::now(),
        });
        assert_eq!(rec.ticker(), None);
        assert_eq!(rec.kind(), "index");
    }

    #[test]
    fn ticker_accessor_covers_company_records() {
        assert_eq!(Record::Quote(sample_quote()).ticker(), Some("AAPL"));
    }
}
