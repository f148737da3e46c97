//! history.rs — Per-ticker CSV persistence.
//!
//! The streaming loops append one row per observation to
//! `<data>/<TICKER>/prices.csv` and `<data>/<TICKER>/indicators.csv`; the
//! analysis endpoint reads pre-supplied `date,close` history files. Headers
//! are written exactly once, on file creation. The formats are fixed and
//! numeric, so parsing stays a simple comma split.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PRICES_FILE: &str = "prices.csv";
pub const INDICATORS_FILE: &str = "indicators.csv";

const PRICES_HEADER: &str = "timestamp,price,volume";
const INDICATORS_HEADER: &str = "timestamp,pe,eps,sma50,rsi14";

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub ts: DateTime<Utc>,
    pub price: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub ts: DateTime<Utc>,
    pub pe: Option<f64>,
    pub eps: Option<f64>,
    pub sma50: Option<f64>,
    pub rsi14: Option<f64>,
}

/// One close observation from a pre-supplied history file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

fn ticker_file(data_dir: &Path, ticker: &str, file: &str) -> Result<PathBuf> {
    let dir = data_dir.join(ticker);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir.join(file))
}

fn append_line(path: &Path, header: &str, line: &str) -> Result<()> {
    let write_header = !path.exists();
    let mut fp = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    if write_header {
        writeln!(fp, "{header}")?;
    }
    writeln!(fp, "{line}")?;
    Ok(())
}

pub fn append_price(data_dir: &Path, ticker: &str, row: &PriceRow) -> Result<()> {
    let path = ticker_file(data_dir, ticker, PRICES_FILE)?;
    let line = format!("{},{},{}", row.ts.to_rfc3339(), row.price, row.volume);
    append_line(&path, PRICES_HEADER, &line)
}

pub fn append_indicators(data_dir: &Path, ticker: &str, row: &IndicatorRow) -> Result<()> {
    let path = ticker_file(data_dir, ticker, INDICATORS_FILE)?;
    let line = format!(
        "{},{},{},{},{}",
        row.ts.to_rfc3339(),
        fmt_opt(row.pe),
        fmt_opt(row.eps),
        fmt_opt(row.sma50),
        fmt_opt(row.rsi14)
    );
    append_line(&path, INDICATORS_HEADER, &line)
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Prices streamed so far for a ticker, in file order. Empty when nothing
/// has been persisted yet.
pub fn load_streamed_prices(data_dir: &Path, ticker: &str) -> Result<Vec<f64>> {
    let path = data_dir.join(ticker).join(PRICES_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut out = Vec::new();
    for line in content.lines().skip(1) {
        let mut cols = line.split(',');
        let price = cols.nth(1).and_then(|p| p.trim().parse::<f64>().ok());
        if let Some(p) = price {
            out.push(p);
        }
    }
    Ok(out)
}

/// Parse a pre-supplied price history CSV with `date` and `close` columns
/// (case-insensitive headers, any column order), sorted by date ascending.
pub fn load_close_series(path: &Path) -> Result<Vec<ClosePoint>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading price history {}", path.display()))?;
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| anyhow!("empty price history {}", path.display()))?;
    let cols: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let date_idx = cols
        .iter()
        .position(|c| c == "date")
        .ok_or_else(|| anyhow!("price history {} has no 'date' column", path.display()))?;
    let close_idx = cols
        .iter()
        .position(|c| c == "close")
        .ok_or_else(|| anyhow!("price history {} has no 'close' column", path.display()))?;

    let mut out = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let raw_date = fields.get(date_idx).map(|s| s.trim()).unwrap_or_default();
        let raw_close = fields.get(close_idx).map(|s| s.trim()).unwrap_or_default();
        let date = parse_date(raw_date)
            .with_context(|| format!("bad date '{raw_date}' in {}", path.display()))?;
        let close: f64 = raw_close
            .parse()
            .with_context(|| format!("bad close '{raw_close}' in {}", path.display()))?;
        out.push(ClosePoint { date, close });
    }
    out.sort_by_key(|p| p.date);
    Ok(out)
}

/// Accepts plain dates and datetime strings with a leading `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|e| anyhow!("{e}"))
}
