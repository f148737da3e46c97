// src/market/providers/news_rss.rs
//
// Codec for the per-ticker headline RSS feed. Kept separate from the
// provider so the XML shape has one owner.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::market::normalize_text;
use crate::record::NewsItem;

const DEFAULT_PUBLISHER: &str = "Yahoo Finance";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_utc(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC)
        .unix_timestamp();
    DateTime::<Utc>::from_timestamp(unix, 0)
}

/// Parse a headline feed into news records for one ticker. Items without a
/// title are dropped; `limit` caps the output. Unparseable publish dates
/// fall back to the observation time.
pub fn parse_news_feed(xml: &str, ticker: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let rss: Rss = from_str(xml).context("parsing news feed xml")?;
    let now = Utc::now();

    let mut out = Vec::new();
    for it in rss.channel.item {
        if out.len() == limit {
            break;
        }
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let summary = normalize_text(it.description.as_deref().unwrap_or_default());
        out.push(NewsItem {
            ticker: ticker.to_ascii_uppercase(),
            title,
            summary,
            publisher: DEFAULT_PUBLISHER.to_string(),
            link: it.link,
            published_at: it
                .pub_date
                .as_deref()
                .and_then(parse_rfc2822_to_utc)
                .unwrap_or(now),
            observed_at: now,
        });
    }

    counter!("fetch_news_total").increment(out.len() as u64);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Ticker News</title>
    <item>
      <title>Apple unveils new silicon roadmap</title>
      <link>https://example.com/a</link>
      <pubDate>Thu, 06 Aug 2026 13:30:00 +0000</pubDate>
      <description>Apple outlined a multi-year chip plan.</description>
    </item>
    <item>
      <title></title>
      <description>orphan description</description>
    </item>
    <item>
      <title>Suppliers ramp up &amp;nbsp;orders</title>
      <pubDate>not a date</pubDate>
      <description><![CDATA[Analysts see <b>higher</b> orders.]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn titleless_items_are_dropped() {
        let items = parse_news_feed(FEED, "aapl", 5).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|n| n.ticker == "AAPL"));
    }

    #[test]
    fn text_is_normalized() {
        let items = parse_news_feed(FEED, "AAPL", 5).unwrap();
        assert_eq!(items[1].title, "Suppliers ramp up orders");
        assert_eq!(items[1].summary, "Analysts see higher orders.");
    }

    #[test]
    fn publish_dates_parse_rfc2822() {
        let items = parse_news_feed(FEED, "AAPL", 5).unwrap();
        assert_eq!(items[0].published_at.to_rfc3339(), "2026-08-06T13:30:00+00:00");
        // unparseable date falls back to observation time
        assert_eq!(items[1].published_at, items[1].observed_at);
    }

    #[test]
    fn limit_caps_the_output() {
        let items = parse_news_feed(FEED, "AAPL", 1).unwrap();
        assert_eq!(items.len(), 1);
    }
}
