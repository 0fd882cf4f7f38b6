// src/ingest/config.rs
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::ingest::types::FeedDescriptor;

#[derive(serde::Deserialize)]
struct FeedsFile {
    #[serde(default)]
    feeds: Vec<FeedDescriptor>,
}

/// Load the feed list (TOML or JSON, `{ feeds = [{ name, url }] }`).
/// Order is preserved; it is the merge order of the run.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedDescriptor>> {
    let file: FeedsFile = crate::config::load_structured(path)?;
    let feeds = clean_list(file.feeds);
    if feeds.is_empty() {
        bail!("feed list {} contains no usable feeds", path.display());
    }
    Ok(feeds)
}

/// Trim, drop entries without name or url, drop exact repeats. Keeps first occurrence order.
fn clean_list(items: Vec<FeedDescriptor>) -> Vec<FeedDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim().to_string();
        let url = it.url.trim().to_string();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if seen.insert((name.clone(), url.clone())) {
            out.push(FeedDescriptor { name, url });
        }
    }
    out
}
