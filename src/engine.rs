//! # Analysis Engine
//! Pure logic that maps `(7-day trend, sentiment score)` → `Verdict`, plus
//! the wrapper that assembles a full `AnalysisReport` for one configured
//! ticker. The decision core has no I/O, suitable for unit tests and future
//! offline evaluation.

use anyhow::{anyhow, Context, Result};
use std::fs;

use crate::config::TickerAnalysis;
use crate::decision::{AnalysisReport, Verdict};
use crate::history;
use crate::indicators;
use crate::sentiment::SentimentAnalyzer;

/// A 7-day move within ±1% is treated as flat.
pub const TREND_EPSILON: f64 = 0.01;

/// Combine the price trend with the document sentiment. Both signals must
/// agree before leaving HOLD.
pub fn make_decision(trend: f64, sentiment: i32) -> Verdict {
    if sentiment > 0 && trend > TREND_EPSILON {
        Verdict::Buy
    } else if sentiment < 0 && trend < -TREND_EPSILON {
        Verdict::Sell
    } else {
        Verdict::Hold
    }
}

/// Full analysis for one ticker: price history → 7-day return, documents →
/// sentiment score, then the combined verdict. Missing or too-short inputs
/// are errors — this endpoint has no degraded mode.
pub fn run_analysis(spec: &TickerAnalysis) -> Result<AnalysisReport> {
    let series = history::load_close_series(&spec.prices)?;
    let latest = series
        .last()
        .ok_or_else(|| anyhow!("empty price history {}", spec.prices.display()))?;
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let trend = indicators::seven_day_return(&closes).ok_or_else(|| {
        anyhow!(
            "price history {} is too short for a 7-day return",
            spec.prices.display()
        )
    })?;

    let mut text = String::new();
    for path in &spec.documents {
        let doc = fs::read_to_string(path)
            .with_context(|| format!("reading document {}", path.display()))?;
        text.push_str(&doc);
        text.push('\n');
    }
    let (sentiment_score, _tokens) = SentimentAnalyzer::new().score_text(&text);

    Ok(AnalysisReport {
        latest_price_date: latest.date,
        latest_close_price: latest.close,
        seven_day_return: trend,
        sentiment_score,
        decision: make_decision(trend, sentiment_score),
    })
}
