// src/ingest/normalize.rs
//! Feed normalizer: the one place where RSS / RDF / Atom shape differences are handled.
//!
//! Contract: given a parsed tree, return 0..n `RawEntry` in document order.
//! RSS items come first, then Atom entries. Nothing in here returns an error;
//! unusable entries and unparseable dates simply disappear.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::types::RawEntry;
use crate::ingest::xml::TEXT_KEY;

/// Normalize one parsed feed document.
pub fn entries_from_tree(tree: &Value) -> Vec<RawEntry> {
    let rss_items = tree
        .pointer("/rss/channel/item")
        .or_else(|| tree.pointer("/channel/item"))
        .or_else(|| tree.pointer("/RDF/item"))
        .or_else(|| tree.pointer("/rdf/item"));
    let atom_entries = tree.pointer("/feed/entry");

    let mut out = Vec::new();

    for it in as_list(rss_items) {
        let title = pick_text(it.get("title"));
        let link = link_of(it.get("link"));
        let description = first_non_empty(&[
            pick_text(it.get("description")),
            pick_text(it.get("summary")),
            pick_text(it.get("encoded")),
        ]);
        let published_at = parse_timestamp(it.get("pubDate"))
            .or_else(|| parse_timestamp(it.get("date")));
        push_entry(&mut out, title, link, description, published_at);
    }

    for en in as_list(atom_entries) {
        let title = pick_text(en.get("title"));
        let link = link_of(en.get("link"));
        let description =
            first_non_empty(&[pick_text(en.get("summary")), pick_text(en.get("content"))]);
        let published_at = parse_timestamp(en.get("published"))
            .or_else(|| parse_timestamp(en.get("updated")));
        push_entry(&mut out, title, link, description, published_at);
    }

    out
}

fn push_entry(
    out: &mut Vec<RawEntry>,
    title: String,
    link: String,
    description: String,
    published_at: Option<DateTime<Utc>>,
) {
    let title = title.trim();
    let link = link.trim();
    if title.is_empty() || link.is_empty() {
        return;
    }
    out.push(RawEntry {
        title: title.to_string(),
        link: link.to_string(),
        description: crate::ingest::clean_description(&description),
        published_at,
    });
}

/// Single object, sequence or nothing → slice-like list.
fn as_list(v: Option<&Value>) -> Vec<&Value> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Text content of a node: plain string, `#text` of an element with attributes,
/// or the first element of an accidental sequence.
fn pick_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Object(map)) => map
            .get(TEXT_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::Array(items)) => pick_text(items.first()),
    }
}

/// Link resolution: among several link nodes prefer `rel="alternate"`, else the first
/// that resolves to something; a link node yields `href` or else its text.
fn link_of(v: Option<&Value>) -> String {
    let candidates = as_list(v);
    let alternate = candidates
        .iter()
        .find(|l| l.get("rel").and_then(Value::as_str) == Some("alternate"));
    if let Some(alt) = alternate {
        let href = href_or_text(alt);
        if !href.is_empty() {
            return href;
        }
    }
    candidates
        .iter()
        .map(|l| href_or_text(l))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

fn href_or_text(v: &Value) -> String {
    match v.get("href").and_then(Value::as_str) {
        Some(href) if !href.trim().is_empty() => href.to_string(),
        _ => pick_text(Some(v)),
    }
}

fn first_non_empty(options: &[String]) -> String {
    options
        .iter()
        .find(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}

fn parse_timestamp(v: Option<&Value>) -> Option<DateTime<Utc>> {
    let text = pick_text(v);
    parse_datetime_lenient(&text)
}

/// Best-effort timestamp parsing. `None` for anything we cannot read.
pub fn parse_datetime_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let parsed = OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond()));
    if parsed.is_some() {
        return parsed;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn rss_single_item_object() {
        let tree = json!({"rss": {"channel": {"item": {
            "title": "Solo", "link": "https://x.test/1",
            "description": "<b>desc</b>", "pubDate": "Mon, 06 Oct 2025 09:00:00 +0000"
        }}}});
        let out = entries_from_tree(&tree);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Solo");
        assert_eq!(out[0].description, "desc");
        assert_eq!(
            out[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 6, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn absent_collections_yield_nothing() {
        assert!(entries_from_tree(&json!({"rss": {"channel": {}}})).is_empty());
        assert!(entries_from_tree(&json!({"feed": {"title": "x"}})).is_empty());
        assert!(entries_from_tree(&json!({})).is_empty());
    }

    #[test]
    fn atom_prefers_alternate_link() {
        let tree = json!({"feed": {"entry": [{
            "title": {"type": "text", "#text": "Atom A"},
            "link": [
                {"rel": "self", "href": "https://x.test/self"},
                {"rel": "alternate", "href": "https://x.test/alt"}
            ],
            "content": "body",
            "updated": "2025-01-02T03:04:05Z"
        }, {
            "title": "Atom B",
            "link": [{"rel": "enclosure", "href": "https://x.test/first"}, {"href": "https://x.test/second"}],
            "summary": "sum"
        }]}});
        let out = entries_from_tree(&tree);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "Atom A");
        assert_eq!(out[0].link, "https://x.test/alt");
        assert_eq!(out[0].description, "body");
        assert!(out[0].published_at.is_some());
        assert_eq!(out[1].link, "https://x.test/first");
        assert_eq!(out[1].published_at, None);
    }

    #[test]
    fn entries_without_title_or_link_are_dropped() {
        let tree = json!({"rss": {"channel": {"item": [
            {"title": "", "link": "https://x.test/1"},
            {"title": "No link"},
            {"title": "  ", "link": "https://x.test/3"},
            {"title": "Ok", "link": "https://x.test/4"}
        ]}}});
        let out = entries_from_tree(&tree);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link, "https://x.test/4");
    }

    #[test]
    fn bad_dates_become_absent() {
        let tree = json!({"rss": {"channel": {"item": [
            {"title": "A", "link": "https://x.test/a", "pubDate": "yesterday-ish"},
            {"title": "B", "link": "https://x.test/b", "pubDate": "garbage", "date": "2025-03-01"}
        ]}}});
        let out = entries_from_tree(&tree);
        assert_eq!(out[0].published_at, None);
        assert_eq!(
            out[1].published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rdf_items_are_read() {
        let tree = json!({"RDF": {"item": [{"title": "R", "link": "https://x.test/r"}]}});
        assert_eq!(entries_from_tree(&tree).len(), 1);
    }
}
