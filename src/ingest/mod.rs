// src/ingest/mod.rs
pub mod config;
pub mod normalize;
pub mod providers;
pub mod types;
pub mod xml;

use crate::ingest::types::{CandidateItem, FeedProvider};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Items with a known timestamp older than this are dropped.
pub const RETENTION_HOURS: i64 = 72;

const TITLE_BRACKETS: [char; 12] = [
    '【', '】', '[', ']', '（', '）', '(', ')', '「', '」', '『', '』',
];

fn re_ws() -> &'static regex::Regex {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap())
}

/// Clean feed description text: decode entities, strip tags, collapse whitespace.
pub fn clean_description(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    re_ws().replace_all(&out, " ").trim().to_string()
}

/// Dedup key for a title: width-fold, lowercase, brackets → spaces, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let folded: String = title
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .map(|c| if TITLE_BRACKETS.contains(&c) { ' ' } else { c })
        .collect();
    re_ws().replace_all(&folded, " ").trim().to_string()
}

/// True when the timestamp is known and older than the retention horizon.
pub fn outside_window(now: DateTime<Utc>, published_at: Option<DateTime<Utc>>) -> bool {
    match published_at {
        Some(p) => now.signed_duration_since(p) > Duration::hours(RETENTION_HOURS),
        None => false,
    }
}

/// Window filter followed by first-wins title dedup.
/// Returns (kept, window_dropped, dedup_dropped).
pub fn filter_window_dedup(
    now: DateTime<Utc>,
    items: Vec<CandidateItem>,
) -> (Vec<CandidateItem>, usize, usize) {
    let mut window_out = 0usize;
    let mut dedup_out = 0usize;
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());

    for item in items {
        if outside_window(now, item.published_at) {
            window_out += 1;
            continue;
        }
        if !seen_titles.insert(normalize_title(&item.title)) {
            tracing::debug!(target: "ingest", id = %item.id, source = %item.source_name, "duplicate title dropped");
            dedup_out += 1;
            continue;
        }
        keep.push(item);
    }

    (keep, window_out, dedup_out)
}

/// Fetch every provider concurrently and merge in provider order.
/// A failing feed is logged, counted and contributes nothing.
pub async fn run_once(providers: &[Box<dyn FeedProvider>]) -> Vec<CandidateItem> {
    crate::metrics::ensure_metrics_described();

    let results = futures::future::join_all(providers.iter().map(|p| p.fetch_entries())).await;

    let mut out = Vec::new();
    for (provider, result) in providers.iter().zip(results) {
        counter!("ingest_feeds_total").increment(1);
        match result {
            Ok(entries) => {
                tracing::info!(target: "ingest", feed = provider.name(), entries = entries.len(), "feed ok");
                counter!("ingest_entries_total").increment(entries.len() as u64);
                out.extend(
                    entries
                        .into_iter()
                        .map(|raw| CandidateItem::from_raw(raw, provider.name())),
                );
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = %e, feed = provider.name(), "feed skipped");
                counter!("ingest_feed_errors_total").increment(1);
            }
        }
    }
    out
}
