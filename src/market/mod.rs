// src/market/mod.rs
pub mod providers;
pub mod types;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "fetch_quotes_total",
            "Quote payload rows parsed from providers."
        );
        describe_counter!("fetch_news_total", "News items parsed from provider feeds.");
        describe_counter!(
            "fetch_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!(
            "fetch_parse_ms",
            "Provider payload parse time in milliseconds."
        );
    });
}

/// Normalize feed text: decode HTML entities, strip tags, unify smart quotes,
/// collapse whitespace. Capped at 1500 chars.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}
