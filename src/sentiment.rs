use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Lexicon-backed keyword scorer for analysis documents.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Returns (score, token count). The score is the sum of lexicon weights
    /// over all tokens; words outside the lexicon contribute nothing.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let mut score: i32 = 0;
        let mut count: usize = 0;
        for tok in tokenize(text) {
            score += LEXICON.get(tok.as_str()).copied().unwrap_or(0);
            count += 1;
        }
        (score, count)
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}
