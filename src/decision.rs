//! decision.rs — Verdict and report types for the analysis endpoint.
//!
//! The analysis output is deliberately plain: an uppercase verdict plus the
//! handful of numbers that produced it, rendered as `key: value` lines for
//! easy consumption by scripts and UIs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market-action verdict for one analyzed ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Buy => "BUY",
            Verdict::Hold => "HOLD",
            Verdict::Sell => "SELL",
        };
        f.write_str(s)
    }
}

/// Everything the analyze endpoint reports for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub latest_price_date: NaiveDate,
    pub latest_close_price: f64,
    pub seven_day_return: f64,
    pub sentiment_score: i32,
    pub decision: Verdict,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "latest_price_date: {}", self.latest_price_date)?;
        writeln!(f, "latest_close_price: {}", self.latest_close_price)?;
        writeln!(f, "7_day_return: {:.4}", self.seven_day_return)?;
        writeln!(f, "sentiment_score: {}", self.sentiment_score)?;
        writeln!(f, "decision: {}", self.decision)
    }
}
