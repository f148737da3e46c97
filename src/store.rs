//! store.rs — Append-only in-memory vector index.
//!
//! Each ingested `Record` is summarized into one searchable sentence,
//! embedded, and kept alongside the record. Entries are never mutated or
//! deleted; the store lives exactly as long as the session that owns it.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::embed::TextEmbedder;
use crate::record::Record;

/// One indexed fact: derived summary, its embedding, the originating record.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub summary: String,
    pub embedding: Vec<f32>,
    pub record: Record,
}

pub struct VectorStore {
    embedder: Arc<dyn TextEmbedder>,
    entries: Mutex<Vec<IndexedEntry>>,
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_records_total",
            "Records appended to the vector store."
        );
    });
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        ensure_metrics_described();
        Self {
            embedder,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// The embedder shared between ingestion and querying. Retrieval must
    /// embed questions into the same space the entries were indexed in.
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// Summarize, embed, and append one record. Only an embedding failure
    /// propagates; everything else is infallible.
    pub fn append(&self, record: Record) -> Result<()> {
        let summary = summarize(&record);
        let embedding = self.embedder.embed(&summary)?;
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.push(IndexedEntry {
            summary,
            embedding,
            record,
        });
        counter!("ingest_records_total").increment(1);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in insertion order, optionally restricted to one ticker
    /// (case-insensitive exact match on the record's ticker).
    pub fn snapshot(&self, ticker: Option<&str>) -> Vec<IndexedEntry> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        match ticker {
            None => entries.clone(),
            Some(t) => entries
                .iter()
                .filter(|e| {
                    e.record
                        .ticker()
                        .is_some_and(|rt| rt.eq_ignore_ascii_case(t))
                })
                .cloned()
                .collect(),
        }
    }
}

/// Derive the searchable summary for a record. Deterministic per kind; the
/// retrieval quality depends on these sentences naming the fields a user
/// would ask about.
pub fn summarize(record: &Record) -> String {
    match record {
        Record::Quote(q) => format!(
            "{} ({}) stock - Current Price: ${:.2}, Change: {:.2}%, Sector: {}, Industry: {}",
            q.company_name, q.ticker, q.current_price, q.percent_change, q.sector, q.industry
        ),
        Record::News(n) => format!("{} - {} (Publisher: {})", n.title, n.summary, n.publisher),
        Record::Index(i) => format!(
            "{} Index - Current: {:.2}, Change: {:.2}%",
            i.index_name, i.current_value, i.percent_change
        ),
        Record::Industry(n) => format!(
            "Industry Analysis: {} sector within {} industry",
            n.industry, n.sector
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbedder;
    use crate::record::{IndexSnapshot, Quote};
    use chrono::Utc;

    fn quote(ticker: &str) -> Record {
        Record::Quote(Quote {
            ticker: ticker.into(),
            company_name: "Apple Inc.".into(),
            current_price: 150.0,
            price_change: 1.85,
            percent_change: 1.25,
            volume: 51_234_567,
            sector: "Technology".into(),
            industry: "Consumer Electronics".into(),
            market_cap: None,
            pe_ratio: None,
            observed_at: Utc::now(),
        })
    }

    fn store() -> VectorStore {
        VectorStore::new(Arc::new(HashEmbedder::new()))
    }

    #[test]
    fn summary_derivation_is_idempotent() {
        let rec = quote("AAPL");
        assert_eq!(summarize(&rec), summarize(&rec));
        assert!(summarize(&rec).contains("Apple Inc. (AAPL)"));
        assert!(summarize(&rec).contains("$150.00"));
    }

    #[test]
    fn append_keeps_insertion_order() {
        let s = store();
        s.append(quote("AAPL")).unwrap();
        s.append(quote("TSLA")).unwrap();
        s.append(quote("NVDA")).unwrap();
        let all = s.snapshot(None);
        let tickers: Vec<_> = all
            .iter()
            .map(|e| e.record.ticker().unwrap().to_string())
            .collect();
        assert_eq!(tickers, vec!["AAPL", "TSLA", "NVDA"]);
    }

    #[test]
    fn ticker_filter_is_case_insensitive() {
        let s = store();
        s.append(quote("AAPL")).unwrap();
        s.append(quote("TSLA")).unwrap();
        assert_eq!(s.snapshot(Some("aapl")).len(), 1);
        assert_eq!(s.snapshot(Some("AAPL")).len(), 1);
        assert!(s.snapshot(Some("MSFT")).is_empty());
    }

    #[test]
    fn market_wide_records_never_match_a_ticker_filter() {
        let s = store();
        s.append(Record::Index(IndexSnapshot {
            index_name: "S&P 500".into(),
            symbol: "^GSPC".into(),
            current_value: 6400.21,
            change: 28.66,
            percent_change: 0.45,
            observed_at: Utc::now(),
        }))
        .unwrap();
        assert!(s.snapshot(Some("AAPL")).is_empty());
        assert_eq!(s.snapshot(None).len(), 1);
    }
}
