//! embed.rs — Text embedding seam.
//!
//! The pipeline only needs "text in, fixed-length vector out"; the trait
//! keeps the store and retriever independent of any concrete model so a
//! sentence-transformer backend can be swapped in without touching either.
//! The default implementation is a deterministic bag-of-hashed-tokens
//! embedder: no model download, stable across runs, good enough for
//! lexical-overlap retrieval over a small corpus.

use anyhow::Result;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Vector width shared by ingestion and querying.
pub const EMBEDDING_DIM: usize = 384;

pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dim(&self) -> usize;
}

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "how", "in", "is",
        "it", "its", "of", "on", "s", "that", "the", "this", "to", "was", "were", "what", "when",
        "where", "which", "who", "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Deterministic hash embedder: each token lands in a SHA-256-derived bucket,
/// counts are L2-normalized. Empty text yields the zero vector.
#[derive(Debug, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        for tok in tokenize(text) {
            v[bucket(&tok)] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Lowercased alphanumeric tokens, minus stop words and bare numbers.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
}

fn bucket(token: &str) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(raw) % EMBEDDING_DIM as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic() {
        let e = HashEmbedder::new();
        let a = e.embed("Apple reports strong quarterly growth").unwrap();
        let b = e.embed("Apple reports strong quarterly growth").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
    }

    #[test]
    fn non_empty_text_yields_unit_vector() {
        let e = HashEmbedder::new();
        let v = e.embed("semiconductor demand keeps rising").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn empty_and_stopword_only_text_yields_zero_vector() {
        let e = HashEmbedder::new();
        for text in ["", "the is of and", "42 100"] {
            let v = e.embed(text).unwrap();
            assert!(v.iter().all(|x| *x == 0.0), "non-zero vector for {text:?}");
        }
    }

    #[test]
    fn shared_tokens_move_vectors_closer() {
        let e = HashEmbedder::new();
        let a = e.embed("chip production ramps up").unwrap();
        let b = e.embed("chip production slows down").unwrap();
        let c = e.embed("bond yields tick higher").unwrap();
        let dot = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(p, q)| p * q).sum::<f32>();
        assert!(dot(&a, &b) > dot(&a, &c));
    }
}
