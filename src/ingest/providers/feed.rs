// src/ingest/providers/feed.rs
use async_trait::async_trait;
use metrics::histogram;
use std::time::Duration;

use crate::ingest::normalize::entries_from_tree;
use crate::ingest::types::{FeedDescriptor, FeedError, FeedProvider, RawEntry};
use crate::ingest::xml::parse_tree;

const USER_AGENT: &str = concat!("daily-digest/", env!("CARGO_PKG_VERSION"));

/// One RSS/Atom source, either fetched over HTTP or read from an in-memory fixture.
pub struct FeedSource {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl FeedSource {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    /// Share one client across feeds so connection pools are reused.
    pub fn from_descriptor(desc: &FeedDescriptor, client: reqwest::Client) -> Self {
        Self {
            name: desc.name.clone(),
            mode: Mode::Http {
                url: desc.url.clone(),
                client,
            },
        }
    }

    fn parse_entries_from_str(&self, body: &str) -> Result<Vec<RawEntry>, FeedError> {
        let t0 = std::time::Instant::now();
        let tree = parse_tree(body)?;
        let out = entries_from_tree(&tree);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        tracing::debug!(target: "ingest", feed = %self.name, entries = out.len(), ms, "feed parsed");
        Ok(out)
    }
}

/// HTTP client used for feeds and the engagement endpoint.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

#[async_trait]
impl FeedProvider for FeedSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>, FeedError> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_entries_from_str(s),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url.as_str())
                    .send()
                    .await
                    .map_err(|source| FeedError::Transport {
                        url: url.clone(),
                        source,
                    })?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FeedError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let body = resp.text().await.map_err(|source| FeedError::Transport {
                    url: url.clone(),
                    source,
                })?;
                self.parse_entries_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
