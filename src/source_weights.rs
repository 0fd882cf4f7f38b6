//! # Source Weights
//!
//! Configured per-source base score. Lookup is by exact source name as it
//! appears in the feed list; unconfigured sources get [`DEFAULT_SOURCE_WEIGHT`].
//! Non-finite configured values are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SOURCE_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceWeights(BTreeMap<String, f64>);

impl SourceWeights {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn weight_for(&self, source: &str) -> f64 {
        match self.0.get(source) {
            Some(&w) if w.is_finite() => w,
            _ => DEFAULT_SOURCE_WEIGHT,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
