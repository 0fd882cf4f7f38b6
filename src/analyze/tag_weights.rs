//! Learned tag weights: the only state carried from one run to the next.
//!
//! Each run: decay every known weight by [`DECAY`], add `ln(1+count) * GAIN`
//! to every tag of every item that received engagement, clamp to
//! `[-WEIGHT_BOUND, WEIGHT_BOUND]`, round to 4 decimals, then drop weights
//! below [`PRUNE_BELOW`] in magnitude.
//!
//! Persisted shape: `{ "updatedAtJst": "...", "weights": { "tag": 0.1234 } }`.
//! A missing or unreadable file is an empty table, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::analyze::classify::ClassifiedItem;
use crate::engagement::EngagementMap;

pub const DECAY: f64 = 0.92;
pub const GAIN: f64 = 0.35;
pub const WEIGHT_BOUND: f64 = 3.0;
/// Weights smaller than this in magnitude are removed from the table.
pub const PRUNE_BELOW: f64 = 0.001;

/// Round half away from zero to 4 decimals.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn clamp_weight(x: f64) -> f64 {
    x.clamp(-WEIGHT_BOUND, WEIGHT_BOUND)
}

/// tag → weight, ordered so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagWeightTable(BTreeMap<String, f64>);

impl TagWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown tags weigh 0.
    pub fn get(&self, tag: &str) -> f64 {
        self.0.get(tag).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for TagWeightTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Yesterday's table + today's items + engagement → today's table.
pub fn update(
    prior: &TagWeightTable,
    items: &[ClassifiedItem],
    engagement: &EngagementMap,
) -> TagWeightTable {
    // 1) decay
    let mut next: BTreeMap<String, f64> = prior
        .0
        .iter()
        .filter(|(_, w)| w.is_finite())
        .map(|(tag, w)| (tag.clone(), round4(w * DECAY)))
        .collect();

    // 2) reinforce
    let mut reinforced = 0usize;
    for it in items {
        let count = engagement.count(&it.item.id);
        if count == 0 {
            continue;
        }
        let gain = (count as f64).ln_1p() * GAIN;
        for tag in &it.tags {
            let v = next.get(tag).copied().unwrap_or(0.0) + gain;
            next.insert(tag.clone(), clamp_weight(round4(v)));
            reinforced += 1;
        }
    }

    // 3) bound, then drop tags that decayed to noise
    for w in next.values_mut() {
        *w = round4(clamp_weight(*w));
    }
    next.retain(|_, w| w.abs() >= PRUNE_BELOW);

    tracing::info!(
        target: "tag_weights",
        prior = prior.len(),
        next = next.len(),
        reinforced,
        "tag weights updated"
    );
    TagWeightTable(next)
}

/// Read the previous run's table. Missing or malformed state → empty table.
pub fn load_prior(path: &Path) -> TagWeightTable {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(target: "tag_weights", path = %path.display(), "no prior tag weights, starting empty");
            return TagWeightTable::new();
        }
        Err(e) => {
            tracing::warn!(target: "tag_weights", error = %e, path = %path.display(), "prior tag weights unreadable, starting empty");
            return TagWeightTable::new();
        }
    };
    parse_prior(&content).unwrap_or_else(|reason| {
        tracing::warn!(target: "tag_weights", %reason, path = %path.display(), "prior tag weights corrupt, starting empty");
        TagWeightTable::new()
    })
}

/// Tolerant parse of `{ "weights": { tag: number } }`; non-numeric entries are skipped.
pub fn parse_prior(content: &str) -> Result<TagWeightTable, String> {
    let root: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let weights = root
        .get("weights")
        .and_then(Value::as_object)
        .ok_or_else(|| "missing `weights` object".to_string())?;
    Ok(weights
        .iter()
        .filter_map(|(tag, v)| v.as_f64().filter(|w| w.is_finite()).map(|w| (tag.clone(), w)))
        .collect())
}
