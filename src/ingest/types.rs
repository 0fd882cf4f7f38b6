// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Feed-format-agnostic entry pulled out of one parsed feed document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Uniform item record that every later stage works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: String,
}

impl CandidateItem {
    pub fn from_raw(raw: RawEntry, source_name: &str) -> Self {
        Self {
            id: item_id(&raw.link),
            title: raw.title,
            url: raw.link,
            description: raw.description,
            published_at: raw.published_at,
            source_name: source_name.to_string(),
        }
    }
}

/// Stable item id: first 12 hex chars of SHA-256 over the trimmed link.
pub fn item_id(link: &str) -> String {
    short_hash(link.trim())
}

pub(crate) fn short_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
}

/// Why a single feed contributed nothing this run.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-success status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("feed parse error: {0}")]
    Parse(String),
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetch and normalize the feed. Entries keep document order.
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>, FeedError>;
    fn name(&self) -> &str;
}
