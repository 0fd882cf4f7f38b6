//! Relevance score per item.
//!
//! score = source weight + recency + tag boost + engagement boost (4 decimals)
//! - recency          : `max(0, 2.2 - ln(1 + age_hours))`, undated items count as age 0
//! - tag boost        : sum of learned weights of the item's tags
//! - engagement boost : `ln(1 + count) * 0.6`

use chrono::{DateTime, Utc};

use crate::analyze::classify::ClassifiedItem;
use crate::analyze::tag_weights::{round4, TagWeightTable};
use crate::engagement::EngagementMap;
use crate::source_weights::SourceWeights;

pub const RECENCY_CEILING: f64 = 2.2;
pub const ENGAGEMENT_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    pub item: ClassifiedItem,
    pub score: f64,
}

impl ScoredItem {
    pub fn id(&self) -> &str {
        &self.item.item.id
    }
}

/// The four additive components, unrounded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub source: f64,
    pub recency: f64,
    pub tag_boost: f64,
    pub engagement_boost: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        round4(self.source + self.recency + self.tag_boost + self.engagement_boost)
    }
}

/// Hours since publish, floored at 0. Unknown publish time → 0.
pub fn age_hours(now: DateTime<Utc>, published_at: Option<DateTime<Utc>>) -> f64 {
    match published_at {
        Some(p) => (now.signed_duration_since(p).num_milliseconds() as f64 / 3_600_000.0).max(0.0),
        None => 0.0,
    }
}

pub fn recency(age_hours: f64) -> f64 {
    (RECENCY_CEILING - age_hours.ln_1p()).max(0.0)
}

pub fn engagement_boost(count: u64) -> f64 {
    (count as f64).ln_1p() * ENGAGEMENT_FACTOR
}

/// Inputs shared by every item of one run.
pub struct Scorer<'a> {
    pub now: DateTime<Utc>,
    pub source_weights: &'a SourceWeights,
    pub tag_weights: &'a TagWeightTable,
    pub engagement: &'a EngagementMap,
}

impl Scorer<'_> {
    pub fn breakdown(&self, it: &ClassifiedItem) -> ScoreBreakdown {
        ScoreBreakdown {
            source: self.source_weights.weight_for(&it.item.source_name),
            recency: recency(age_hours(self.now, it.item.published_at)),
            tag_boost: it.tags.iter().map(|t| self.tag_weights.get(t)).sum(),
            engagement_boost: engagement_boost(self.engagement.count(&it.item.id)),
        }
    }

    pub fn score(&self, it: &ClassifiedItem) -> f64 {
        self.breakdown(it).total()
    }

    pub fn score_all(&self, items: Vec<ClassifiedItem>) -> Vec<ScoredItem> {
        items
            .into_iter()
            .map(|item| {
                let b = self.breakdown(&item);
                tracing::debug!(
                    target: "scoring",
                    id = %item.item.id,
                    source = b.source,
                    recency = b.recency,
                    tag_boost = b.tag_boost,
                    engagement_boost = b.engagement_boost,
                    "scored"
                );
                ScoredItem {
                    score: b.total(),
                    item,
                }
            })
            .collect()
    }
}
