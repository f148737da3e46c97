//! retrieve.rs — Similarity search over the vector store.
//!
//! Brute-force linear scan: embed the question, cosine-score every candidate,
//! stable-sort descending, keep scores strictly above the threshold, cut at
//! `top_k`. Fine for a corpus of tens to low hundreds of entries; an ANN
//! index could replace the internals behind the same `query` contract.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::record::Record;
use crate::store::VectorStore;

/// Entries scoring at or below this are never returned.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;

/// Result size used by the session when the caller does not choose one.
pub const DEFAULT_TOP_K: usize = 5;

/// One retrieved record with its score, best first.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub record: Record,
    pub summary: String,
    pub similarity: f32,
}

/// Outcome of a query. `NoData` means the index was empty (globally or after
/// the ticker filter) — a reported condition, not a fault. `Hits` may still
/// be empty when nothing cleared the threshold.
#[derive(Debug, Clone)]
pub enum Retrieval {
    NoData,
    Hits(Vec<ScoredHit>),
}

pub struct Retriever {
    store: Arc<VectorStore>,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("rag_queries_total", "Similarity queries served.");
        describe_counter!(
            "rag_no_data_total",
            "Queries answered with the no-data path."
        );
        describe_counter!("rag_hits_total", "Hits returned across all queries.");
    });
}

impl Retriever {
    pub fn new(store: Arc<VectorStore>) -> Self {
        ensure_metrics_described();
        Self { store }
    }

    /// Rank stored records against a free-text question. The question is
    /// embedded with the same embedder used at ingestion time.
    pub fn query(
        &self,
        question: &str,
        ticker: Option<&str>,
        top_k: usize,
    ) -> Result<Retrieval> {
        counter!("rag_queries_total").increment(1);

        let candidates = self.store.snapshot(ticker);
        if candidates.is_empty() {
            counter!("rag_no_data_total").increment(1);
            return Ok(Retrieval::NoData);
        }

        let query_vec = self.store.embedder().embed(question)?;

        let mut scored: Vec<(f32, crate::store::IndexedEntry)> = candidates
            .into_iter()
            .map(|e| (cosine_similarity(&query_vec, &e.embedding), e))
            .collect();
        // Stable sort: equal scores keep insertion order, so results stay
        // deterministic.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let hits: Vec<ScoredHit> = scored
            .into_iter()
            .filter(|(score, _)| *score > SIMILARITY_THRESHOLD)
            .take(top_k)
            .map(|(similarity, e)| ScoredHit {
                record: e.record,
                summary: e.summary,
                similarity,
            })
            .collect();

        counter!("rag_hits_total").increment(hits.len() as u64);
        Ok(Retrieval::Hits(hits))
    }
}

/// Cosine similarity in [-1, 1]. Defined as 0 when either vector has zero
/// norm so degenerate embeddings can never divide by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
