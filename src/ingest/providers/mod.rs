// src/ingest/providers/mod.rs
pub mod feed;

pub use feed::FeedSource;
