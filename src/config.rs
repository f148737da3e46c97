// src/config.rs
//
// File-backed configuration with env-var path overrides. Two documents:
// the ticker universe for the streaming binary, and the per-ticker analysis
// inputs for the /analyze endpoint. Both accept TOML or JSON.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_UNIVERSE_PATH: &str = "UNIVERSE_CONFIG_PATH";
pub const ENV_ANALYSIS_PATH: &str = "ANALYSIS_CONFIG_PATH";

const UNIVERSE_FALLBACKS: [&str; 2] = ["config/universe.toml", "config/universe.json"];
const ANALYSIS_FALLBACKS: [&str; 2] = ["config/analysis.toml", "config/analysis.json"];

/// Ticker universe + polling cadence for the streaming ingestion binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub tickers: Vec<String>,
    pub poll_price_secs: u64,
    pub poll_indicator_secs: u64,
    pub data_dir: PathBuf,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["AAPL".into(), "TSLA".into(), "NVDA".into()],
            poll_price_secs: 60,
            poll_indicator_secs: 300,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl UniverseConfig {
    /// Load using env var + fallbacks:
    /// 1) $UNIVERSE_CONFIG_PATH
    /// 2) config/universe.toml
    /// 3) config/universe.json
    /// 4) built-in defaults
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_UNIVERSE_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_UNIVERSE_PATH} points to a non-existent path"));
            }
            return Self::load_from(&pb);
        }
        for candidate in UNIVERSE_FALLBACKS {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading universe config {}", path.display()))?;
        parse_config(&content, path)
    }
}

/// Pre-supplied analysis inputs for one ticker: a price-history CSV plus
/// pre-extracted document text files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TickerAnalysis {
    pub prices: PathBuf,
    #[serde(default)]
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub tickers: HashMap<String, TickerAnalysis>,
}

impl AnalysisConfig {
    /// Load using env var + fallbacks; an absent file means no tickers are
    /// configured for analysis (the endpoint then 404s).
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_ANALYSIS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_ANALYSIS_PATH} points to a non-existent path"));
            }
            return Self::load_from(&pb);
        }
        for candidate in ANALYSIS_FALLBACKS {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analysis config {}", path.display()))?;
        parse_config(&content, path)
    }

    /// Case-insensitive ticker lookup.
    pub fn ticker(&self, symbol: &str) -> Option<&TickerAnalysis> {
        self.tickers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(symbol))
            .map(|(_, v)| v)
    }
}

/// Parse TOML first unless the extension says JSON; fall back to the other
/// format so either works regardless of file name.
fn parse_config<T: serde::de::DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext == "json" {
        return serde_json::from_str(content)
            .with_context(|| format!("parsing {}", path.display()));
    }
    match toml::from_str(content) {
        Ok(v) => Ok(v),
        Err(toml_err) => serde_json::from_str(content)
            .map_err(|_| anyhow!("parsing {}: {}", path.display(), toml_err)),
    }
}
