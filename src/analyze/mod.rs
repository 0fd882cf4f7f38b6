// src/analyze/mod.rs
//! Curation stages after ingest: classify → learn tag weights → score → select.

pub mod classify;
pub mod scoring;
pub mod select;
pub mod tag_weights;

// Re-export convenient types.
pub use crate::analyze::classify::{ClassifiedItem, Classifier};
pub use crate::analyze::scoring::{ScoreBreakdown, ScoredItem, Scorer};
pub use crate::analyze::select::{select, SelectionResult};
pub use crate::analyze::tag_weights::TagWeightTable;
