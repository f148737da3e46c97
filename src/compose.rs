//! compose.rs — Rule-based answer composer.
//!
//! Maps retrieved records plus the question's keywords onto a fixed set of
//! response templates. Rules are checked in order and the first rule whose
//! keyword AND record-kind condition both hold wins; no language model is
//! involved.

use crate::record::Record;
use crate::retrieve::ScoredHit;

pub const NO_MATCH_MESSAGE: &str =
    "I couldn't find relevant information to answer your question.";

/// Number of headlines quoted by the news template.
const NEWS_TITLES: usize = 3;

/// Length of the fallback excerpt taken from the top hit's summary.
const EXCERPT_CHARS: usize = 200;

pub fn compose(question: &str, hits: &[ScoredHit]) -> String {
    if hits.is_empty() {
        return NO_MATCH_MESSAGE.to_string();
    }
    let q = question.to_ascii_lowercase();

    if q.contains("price") || q.contains("stock") {
        if let Some(quote) = hits.iter().find_map(|h| match &h.record {
            Record::Quote(q) => Some(q),
            _ => None,
        }) {
            return format!(
                "{} ({}) is currently trading at ${:.2}, which is {:+.2}% from the previous close. \
                 The stock operates in the {} industry within the {} sector.",
                quote.company_name,
                quote.ticker,
                quote.current_price,
                quote.percent_change,
                quote.industry,
                quote.sector
            );
        }
    }

    if q.contains("news") || q.contains("latest") {
        let titles: Vec<String> = hits
            .iter()
            .filter_map(|h| match &h.record {
                Record::News(n) => Some(format!("- {}", n.title)),
                _ => None,
            })
            .take(NEWS_TITLES)
            .collect();
        if !titles.is_empty() {
            return format!("Here are the latest news items:\n{}", titles.join("\n"));
        }
    }

    if q.contains("market") || q.contains("index") {
        let lines: Vec<String> = hits
            .iter()
            .filter_map(|h| match &h.record {
                Record::Index(i) => Some(format!(
                    "{}: {:.2} ({:+.2}%)",
                    i.index_name, i.current_value, i.percent_change
                )),
                _ => None,
            })
            .collect();
        if !lines.is_empty() {
            return format!("Current market overview:\n{}", lines.join("\n"));
        }
    }

    // Fallback: excerpt of the best-scoring summary.
    let top = &hits[0];
    let mut excerpt: String = top.summary.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    format!("Based on the available data: {excerpt}")
}
