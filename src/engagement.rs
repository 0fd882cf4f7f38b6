//! Engagement counts (reader likes) keyed by item id.
//!
//! Fetched once per run from the reaction service:
//! `GET {base}?action=likes` → `{ "likes": { "<item id>": <count> } }`.
//! Any failure yields an empty map; there are no retries.

use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementMap(BTreeMap<String, u64>);

impl EngagementMap {
    /// Missing ids have zero engagement.
    pub fn count(&self, id: &str) -> u64 {
        self.0.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tolerant read of the `likes` payload: counts may be integers, floats or
    /// numeric strings; negatives and junk are dropped, fractions floored.
    pub fn from_likes_payload(payload: &Value) -> Self {
        let Some(likes) = payload.get("likes").and_then(Value::as_object) else {
            return Self::default();
        };
        likes
            .iter()
            .filter_map(|(id, v)| to_count(v).map(|c| (id.clone(), c)))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for EngagementMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn to_count(v: &Value) -> Option<u64> {
    let f = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if f.is_finite() && f > 0.0 {
        Some(f.floor() as u64)
    } else {
        None
    }
}

fn likes_url(base: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}action=likes")
}

/// Best-effort fetch. Never fails; logs and returns an empty map instead.
pub async fn fetch_engagement(client: &reqwest::Client, base: Option<&str>) -> EngagementMap {
    let Some(base) = base else {
        tracing::info!(target: "engagement", "no reaction endpoint configured");
        return EngagementMap::default();
    };
    let url = likes_url(base);

    let resp = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(target: "engagement", error = %e, "reaction service unreachable");
            return EngagementMap::default();
        }
    };
    if !resp.status().is_success() {
        tracing::warn!(target: "engagement", status = resp.status().as_u16(), "reaction service returned error status");
        return EngagementMap::default();
    }
    match resp.json::<Value>().await {
        Ok(payload) => {
            let map = EngagementMap::from_likes_payload(&payload);
            tracing::info!(target: "engagement", items = map.len(), "engagement loaded");
            map
        }
        Err(e) => {
            tracing::warn!(target: "engagement", error = %e, "reaction payload unreadable");
            EngagementMap::default()
        }
    }
}
