//! session.rs — Per-process orchestrator.
//!
//! Owns the vector store, the retriever, and the market-data provider, and
//! remembers which tickers were already ingested so a second `load` for the
//! same symbol is a logged no-op. Provider failures during ingestion are
//! swallowed per source (logged + counted) so one dead feed never blocks the
//! rest of the pass.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use metrics::counter;

use crate::compose;
use crate::market::types::MarketDataProvider;
use crate::record::{IndustryNote, Record};
use crate::retrieve::{Retrieval, Retriever, DEFAULT_TOP_K};
use crate::store::VectorStore;

/// Headlines fetched per ticker ingestion pass.
const NEWS_LIMIT: usize = 5;

/// Questions run by the ticker demo endpoint.
const DEMO_QUESTIONS: [&str; 4] = [
    "What is the current stock price?",
    "What are the latest news about this company?",
    "How is the overall market performing?",
    "What industry does this company operate in?",
];

pub struct Session {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<VectorStore>,
    retriever: Retriever,
    loaded: Mutex<HashSet<String>>,
}

/// Per-kind counts from one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadSummary {
    pub ticker: String,
    pub quotes: usize,
    pub news: usize,
    pub indices: usize,
    pub notes: usize,
    pub already_loaded: bool,
}

/// Composed answer plus the number of retrieved sources behind it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: usize,
}

impl Session {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: Arc<VectorStore>) -> Self {
        let retriever = Retriever::new(store.clone());
        Self {
            provider,
            store,
            retriever,
            loaded: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Full fetch → store pass for one ticker. Already-loaded tickers skip
    /// ingestion for the lifetime of this session.
    pub async fn load(&self, ticker: &str) -> Result<LoadSummary> {
        let symbol = ticker.trim().to_ascii_uppercase();
        {
            let loaded = self.loaded.lock().expect("session mutex poisoned");
            if loaded.contains(&symbol) {
                tracing::info!(ticker = %symbol, "already loaded, skipping ingestion");
                return Ok(LoadSummary {
                    ticker: symbol,
                    already_loaded: true,
                    ..LoadSummary::default()
                });
            }
        }

        let mut summary = LoadSummary {
            ticker: symbol.clone(),
            ..LoadSummary::default()
        };

        let quote = match self.provider.quote(&symbol).await {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(error = ?e, ticker = %symbol, provider = self.provider.name(), "quote fetch failed");
                counter!("fetch_provider_errors_total").increment(1);
                None
            }
        };
        if let Some(q) = &quote {
            self.store.append(Record::Quote(q.clone()))?;
            summary.quotes += 1;
        }

        let news = match self.provider.news(&symbol, NEWS_LIMIT).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = ?e, ticker = %symbol, provider = self.provider.name(), "news fetch failed");
                counter!("fetch_provider_errors_total").increment(1);
                Vec::new()
            }
        };
        for item in news {
            self.store.append(Record::News(item))?;
            summary.news += 1;
        }

        // Industry context derives from the quote; no quote, no note.
        if let Some(q) = quote {
            let note = IndustryNote {
                ticker: symbol.clone(),
                sector: q.sector.clone(),
                industry: q.industry.clone(),
                context: format!(
                    "Analysis of {} sector within {} industry",
                    q.industry, q.sector
                ),
                observed_at: Utc::now(),
            };
            self.store.append(Record::Industry(note))?;
            summary.notes += 1;
        }

        let indices = match self.provider.market_overview().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = ?e, provider = self.provider.name(), "market overview fetch failed");
                counter!("fetch_provider_errors_total").increment(1);
                Vec::new()
            }
        };
        for snapshot in indices {
            self.store.append(Record::Index(snapshot))?;
            summary.indices += 1;
        }

        self.loaded
            .lock()
            .expect("session mutex poisoned")
            .insert(symbol.clone());
        tracing::info!(
            ticker = %symbol,
            quotes = summary.quotes,
            news = summary.news,
            indices = summary.indices,
            notes = summary.notes,
            "ticker ingestion complete"
        );
        Ok(summary)
    }

    /// Retrieve then compose one answer. An empty (or filtered-empty) index
    /// yields the no-data message with zero sources.
    pub fn ask(&self, question: &str, ticker: Option<&str>) -> Result<Answer> {
        match self.retriever.query(question, ticker, DEFAULT_TOP_K)? {
            Retrieval::NoData => {
                let answer = match ticker {
                    Some(t) => format!("No data available for ticker {}.", t.to_ascii_uppercase()),
                    None => "No data available. Please load ticker data first.".to_string(),
                };
                Ok(Answer { answer, sources: 0 })
            }
            Retrieval::Hits(hits) => Ok(Answer {
                answer: compose::compose(question, &hits),
                sources: hits.len(),
            }),
        }
    }

    /// Demo flow behind `GET /{ticker}`: load, then run the canned questions
    /// over everything ingested so far (market-wide records carry no ticker,
    /// so the demo queries unfiltered).
    pub async fn demo(&self, ticker: &str) -> Result<Vec<String>> {
        self.load(ticker).await?;
        let mut out = Vec::with_capacity(DEMO_QUESTIONS.len());
        for question in DEMO_QUESTIONS {
            let a = self.ask(question, None)?;
            out.push(format!("{}\nBased on {} sources.", a.answer, a.sources));
        }
        Ok(out)
    }
}
