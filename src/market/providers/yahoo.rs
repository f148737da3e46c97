// src/market/providers/yahoo.rs
//
// Quote/index/fundamentals provider over the Yahoo-style quote API plus the
// per-ticker headline RSS feed. HTTP mode hits the live endpoints; fixture
// mode feeds canned payloads through the exact same parse paths, which is
// what the tests use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::market::providers::news_rss;
use crate::market::types::{Fundamentals, MarketDataProvider};
use crate::market::ensure_metrics_described;
use crate::record::{IndexSnapshot, Quote};

/// Major indices tracked by the market overview, with display names.
pub const MAJOR_INDICES: [(&str, &str); 3] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
];

const DEFAULT_QUOTE_BASE: &str = "https://query1.finance.yahoo.com";
const DEFAULT_NEWS_BASE: &str = "https://feeds.finance.yahoo.com";

/// Env overrides for the endpoint bases (useful for proxies and tests).
pub const ENV_QUOTE_BASE: &str = "QUOTE_API_BASE";
pub const ENV_NEWS_BASE: &str = "NEWS_FEED_BASE";

pub struct YahooFinanceProvider {
    mode: Mode,
}

enum Mode {
    Http {
        client: reqwest::Client,
        quote_base: String,
        news_base: String,
    },
    /// Canned payloads, parsed through the same code paths as HTTP bodies.
    Fixture {
        quote: String,
        news: String,
        indices: String,
    },
}

impl YahooFinanceProvider {
    pub fn from_env() -> Self {
        ensure_metrics_described();
        Self {
            mode: Mode::Http {
                client: reqwest::Client::new(),
                quote_base: std::env::var(ENV_QUOTE_BASE)
                    .unwrap_or_else(|_| DEFAULT_QUOTE_BASE.to_string()),
                news_base: std::env::var(ENV_NEWS_BASE)
                    .unwrap_or_else(|_| DEFAULT_NEWS_BASE.to_string()),
            },
        }
    }

    pub fn from_fixtures(quote: &str, news: &str, indices: &str) -> Self {
        ensure_metrics_described();
        Self {
            mode: Mode::Fixture {
                quote: quote.to_string(),
                news: news.to_string(),
                indices: indices.to_string(),
            },
        }
    }

    async fn quote_body(&self, symbols: &str) -> Result<String> {
        match &self.mode {
            Mode::Fixture { quote, indices, .. } => {
                // Index symbols are caret-prefixed; everything else is a ticker.
                if symbols.starts_with('^') {
                    Ok(indices.clone())
                } else {
                    Ok(quote.clone())
                }
            }
            Mode::Http {
                client, quote_base, ..
            } => {
                let url = format!("{quote_base}/v7/finance/quote?symbols={symbols}");
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;
                resp.error_for_status()
                    .context("quote endpoint status")?
                    .text()
                    .await
                    .context("reading quote body")
            }
        }
    }

    async fn news_body(&self, ticker: &str) -> Result<String> {
        match &self.mode {
            Mode::Fixture { news, .. } => Ok(news.clone()),
            Mode::Http {
                client, news_base, ..
            } => {
                let url =
                    format!("{news_base}/rss/2.0/headline?s={ticker}&region=US&lang=en-US");
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;
                resp.error_for_status()
                    .context("news feed status")?
                    .text()
                    .await
                    .context("reading news body")
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn quote(&self, ticker: &str) -> Result<Option<Quote>> {
        let body = self.quote_body(ticker).await?;
        parse_quote_payload(&body, ticker)
    }

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<crate::record::NewsItem>> {
        let body = self.news_body(ticker).await?;
        news_rss::parse_news_feed(&body, ticker, limit)
    }

    async fn market_overview(&self) -> Result<Vec<IndexSnapshot>> {
        let symbols = MAJOR_INDICES
            .iter()
            .map(|(s, _)| *s)
            .collect::<Vec<_>>()
            .join(",");
        let body = self.quote_body(&symbols).await?;
        parse_index_payload(&body)
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        let body = self.quote_body(ticker).await?;
        parse_fundamentals_payload(&body, ticker)
    }

    fn name(&self) -> &'static str {
        "YahooFinance"
    }
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRow {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<u64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    eps_trailing_twelve_months: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
}

/// Parse a quote payload for one ticker. A missing or priceless row is
/// "no data", not an error.
pub fn parse_quote_payload(json: &str, ticker: &str) -> Result<Option<Quote>> {
    let t0 = std::time::Instant::now();
    let envelope: QuoteEnvelope =
        serde_json::from_str(json).context("parsing quote payload")?;
    let row = match envelope
        .quote_response
        .result
        .into_iter()
        .find(|r| r.symbol.eq_ignore_ascii_case(ticker))
    {
        Some(r) => r,
        None => return Ok(None),
    };
    let current_price = match row.regular_market_price {
        Some(p) => p,
        None => return Ok(None),
    };

    let quote = Quote {
        ticker: row.symbol.to_ascii_uppercase(),
        company_name: row
            .long_name
            .or(row.short_name)
            .unwrap_or_else(|| ticker.to_ascii_uppercase()),
        current_price,
        price_change: row.regular_market_change.unwrap_or(0.0),
        percent_change: row.regular_market_change_percent.unwrap_or(0.0),
        volume: row.regular_market_volume.unwrap_or(0),
        sector: row.sector.unwrap_or_else(|| "Unknown".to_string()),
        industry: row.industry.unwrap_or_else(|| "Unknown".to_string()),
        market_cap: row.market_cap,
        pe_ratio: row.trailing_pe,
        observed_at: Utc::now(),
    };

    histogram!("fetch_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("fetch_quotes_total").increment(1);
    Ok(Some(quote))
}

/// Parse the index-overview payload; rows without a price are skipped.
pub fn parse_index_payload(json: &str) -> Result<Vec<IndexSnapshot>> {
    let envelope: QuoteEnvelope =
        serde_json::from_str(json).context("parsing index payload")?;

    let mut out = Vec::new();
    for row in envelope.quote_response.result {
        let Some(value) = row.regular_market_price else {
            continue;
        };
        let name = row
            .short_name
            .clone()
            .or_else(|| {
                MAJOR_INDICES
                    .iter()
                    .find(|(s, _)| s.eq_ignore_ascii_case(&row.symbol))
                    .map(|(_, n)| n.to_string())
            })
            .unwrap_or_else(|| row.symbol.clone());
        out.push(IndexSnapshot {
            index_name: name,
            symbol: row.symbol,
            current_value: value,
            change: row.regular_market_change.unwrap_or(0.0),
            percent_change: row.regular_market_change_percent.unwrap_or(0.0),
            observed_at: Utc::now(),
        });
    }
    Ok(out)
}

/// P/E and EPS for one ticker; defaults when the row is absent.
pub fn parse_fundamentals_payload(json: &str, ticker: &str) -> Result<Fundamentals> {
    let envelope: QuoteEnvelope =
        serde_json::from_str(json).context("parsing fundamentals payload")?;
    Ok(envelope
        .quote_response
        .result
        .into_iter()
        .find(|r| r.symbol.eq_ignore_ascii_case(ticker))
        .map(|r| Fundamentals {
            pe: r.trailing_pe,
            eps: r.eps_trailing_twelve_months,
        })
        .unwrap_or_default())
}
