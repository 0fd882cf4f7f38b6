// src/ingest/xml.rs
//! XML text → generic key/value tree.
//!
//! Shape rules (the normalizer relies on them):
//! - element with only text            → `"text"`
//! - element with attributes/children  → `{ "attr": "..", "child": .., "#text": ".." }`
//! - repeated child names              → array, in document order
//! - empty element without attributes  → `""`
//!
//! Namespace prefixes are dropped (`dc:date` → `date`), `xmlns` bindings are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::ingest::types::FeedError;

/// Key under which mixed text content is stored.
pub const TEXT_KEY: &str = "#text";

struct Frame {
    map: Map<String, Value>,
    text: String,
}

impl Frame {
    fn root() -> Self {
        Self {
            map: Map::new(),
            text: String::new(),
        }
    }

    fn open(start: &BytesStart<'_>) -> Result<(String, Self), FeedError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut frame = Self::root();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FeedError::Parse(format!("attribute in <{name}>: {e}")))?;
            let raw_key = attr.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            insert_child(&mut frame.map, key, Value::String(value));
        }
        Ok((name, frame))
    }

    fn finish(self) -> Value {
        let Frame { mut map, text } = self;
        if map.is_empty() {
            return Value::String(text);
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        Value::Object(map)
    }
}

fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// Parse a feed body into a tree rooted at an object keyed by the document element.
pub fn parse_tree(xml: &str) -> Result<Value, FeedError> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text(true);

    // (element name, frame); the bottom entry is the synthetic document root.
    let mut stack: Vec<(String, Frame)> = vec![(String::new(), Frame::root())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Frame::open(&e)?),
            Ok(Event::Empty(e)) => {
                let (name, frame) = Frame::open(&e)?;
                if let Some((_, parent)) = stack.last_mut() {
                    insert_child(&mut parent.map, name, frame.finish());
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(FeedError::Parse("unbalanced closing tag".into()));
                }
                if let Some((name, frame)) = stack.pop() {
                    if let Some((_, parent)) = stack.last_mut() {
                        insert_child(&mut parent.map, name, frame.finish());
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let s = t
                    .unescape()
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                if let Some((_, top)) = stack.last_mut() {
                    top.text.push_str(&s);
                }
            }
            Ok(Event::CData(c)) => {
                let s = String::from_utf8_lossy(&c.into_inner()).into_owned();
                if let Some((_, top)) = stack.last_mut() {
                    top.text.push_str(s.trim());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FeedError::Parse(format!(
                    "xml error at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    if stack.len() != 1 {
        return Err(FeedError::Parse("unclosed element at end of document".into()));
    }
    let (_, root) = stack.remove(0);
    if root.map.is_empty() {
        return Err(FeedError::Parse("document has no root element".into()));
    }
    Ok(Value::Object(root.map))
}

/// Feeds routinely carry HTML entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_and_repeated_children() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item><title>One</title></item>
  <item><title>Two</title></item>
</channel></rss>"#;
        let v = parse_tree(xml).unwrap();
        assert_eq!(v["rss"]["version"], json!("2.0"));
        assert_eq!(v["rss"]["channel"]["item"][0]["title"], json!("One"));
        assert_eq!(v["rss"]["channel"]["item"][1]["title"], json!("Two"));

        let one = parse_tree("<rss><channel><item><title>Solo</title></item></channel></rss>").unwrap();
        assert!(one["rss"]["channel"]["item"].is_object());
    }

    #[test]
    fn attributes_text_cdata_and_prefixes() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">
<entry>
  <title type="html">A &amp; B</title>
  <link rel="alternate" href="https://x.test/a"/>
  <summary><![CDATA[<p>hi</p>]]></summary>
  <dc:date>2025-01-01T00:00:00Z</dc:date>
</entry></feed>"#;
        let v = parse_tree(xml).unwrap();
        let entry = &v["feed"]["entry"];
        assert_eq!(entry["title"][TEXT_KEY], json!("A & B"));
        assert_eq!(entry["title"]["type"], json!("html"));
        assert_eq!(entry["link"]["href"], json!("https://x.test/a"));
        assert_eq!(entry["summary"], json!("<p>hi</p>"));
        assert_eq!(entry["date"], json!("2025-01-01T00:00:00Z"));
        assert!(v["feed"].get("xmlns").is_none());
    }

    #[test]
    fn html_entities_do_not_break_parsing() {
        let v = parse_tree("<rss><channel><item><title>a&nbsp;b&hellip;</title></item></channel></rss>")
            .unwrap();
        assert_eq!(v["rss"]["channel"]["item"]["title"], json!("a b..."));
    }

    #[test]
    fn malformed_is_parse_error() {
        assert!(matches!(
            parse_tree("<rss><channel></rss>"),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(parse_tree("not xml at all"), Err(FeedError::Parse(_))));
    }
}
