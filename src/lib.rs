// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod engagement;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod present;
pub mod source_weights;

// Classification, tag-weight learning, scoring and selection
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{select, ClassifiedItem, Classifier, ScoredItem, SelectionResult, TagWeightTable};
pub use crate::config::rules::{Category, Limits, RulesConfig};
pub use crate::engagement::EngagementMap;
pub use crate::ingest::types::{CandidateItem, FeedProvider};
pub use crate::pipeline::{curate, run_daily, CurationOutput};
