// src/pipeline.rs
//! Daily run: ingest → window/dedup → classify → tag weights → score → select → present.
//!
//! `curate` is pure: every input (clock, rules, engagement, prior weights) is
//! passed in, so identical inputs give identical output. The async wrappers add
//! fetching and file output around it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use std::path::Path;

use crate::analyze::classify::Classifier;
use crate::analyze::scoring::Scorer;
use crate::analyze::select::{select, SelectionResult};
use crate::analyze::tag_weights::{self, TagWeightTable};
use crate::config::rules::RulesConfig;
use crate::config::runtime::RuntimeConfig;
use crate::engagement::{fetch_engagement, EngagementMap};
use crate::ingest::config::load_feeds_from;
use crate::ingest::providers::feed::build_http_client;
use crate::ingest::providers::FeedSource;
use crate::ingest::types::{CandidateItem, FeedProvider};
use crate::ingest::{filter_window_dedup, run_once};
use crate::present::{render, DigestDocuments};

pub const ITEMS_FILE: &str = "items.json";
pub const TODAY_FILE: &str = "today.json";
pub const TAG_WEIGHTS_FILE: &str = "tag_weights.json";
pub const BUILD_META_FILE: &str = "build_meta.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurationCounts {
    pub candidates: usize,
    pub window_dropped: usize,
    pub dedup_dropped: usize,
    pub kept: usize,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurationOutput {
    pub selection: SelectionResult,
    /// Table used for today's scores; persisted as tomorrow's prior.
    pub next_weights: TagWeightTable,
    pub counts: CurationCounts,
}

pub fn curate(
    now: DateTime<Utc>,
    candidates: Vec<CandidateItem>,
    rules: &RulesConfig,
    engagement: &EngagementMap,
    prior: &TagWeightTable,
) -> CurationOutput {
    let n_candidates = candidates.len();
    let (kept, window_dropped, dedup_dropped) = filter_window_dedup(now, candidates);
    counter!("ingest_window_dropped_total").increment(window_dropped as u64);
    counter!("ingest_dedup_total").increment(dedup_dropped as u64);

    let classified = Classifier::new(rules).classify_all(kept);
    let n_kept = classified.len();
    let next_weights = tag_weights::update(prior, &classified, engagement);

    let scorer = Scorer {
        now,
        source_weights: &rules.source_weights,
        tag_weights: &next_weights,
        engagement,
    };
    let selection = select(scorer.score_all(classified), rules);

    let counts = CurationCounts {
        candidates: n_candidates,
        window_dropped,
        dedup_dropped,
        kept: n_kept,
        selected: selection.items.len(),
    };
    tracing::info!(
        target: "pipeline",
        candidates = counts.candidates,
        window_dropped = counts.window_dropped,
        dedup_dropped = counts.dedup_dropped,
        kept = counts.kept,
        selected = counts.selected,
        "curation done"
    );

    CurationOutput {
        selection,
        next_weights,
        counts,
    }
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let mut body = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {file}"))?;
    body.push('\n');
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))
}

/// Persist the four documents under `out_dir`, creating it if needed.
pub fn write_outputs(out_dir: &Path, docs: &DigestDocuments) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;
    write_json(out_dir, ITEMS_FILE, &docs.items)?;
    write_json(out_dir, TODAY_FILE, &docs.today)?;
    write_json(out_dir, TAG_WEIGHTS_FILE, &docs.tag_weights)?;
    write_json(out_dir, BUILD_META_FILE, &docs.meta)?;
    tracing::info!(
        target: "pipeline",
        dir = %out_dir.display(),
        items = docs.items.items.len(),
        "outputs written"
    );
    Ok(())
}

/// Fetch, curate and publish with already-built providers and engagement.
/// The prior weight table is read from (and replaced in) `out_dir`.
pub async fn run_with_providers(
    now: DateTime<Utc>,
    providers: &[Box<dyn FeedProvider>],
    rules: &RulesConfig,
    engagement: &EngagementMap,
    out_dir: &Path,
) -> Result<CurationOutput> {
    let candidates = run_once(providers).await;
    let prior = tag_weights::load_prior(&out_dir.join(TAG_WEIGHTS_FILE));
    let out = curate(now, candidates, rules, engagement, &prior);

    let docs = render(&out.selection, &out.next_weights, now);
    write_outputs(out_dir, &docs)?;
    gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);
    Ok(out)
}

/// The whole batch job as configured by the environment.
pub async fn run_daily(cfg: &RuntimeConfig) -> Result<CurationOutput> {
    let now = Utc::now();
    let feeds = load_feeds_from(&cfg.feeds_path)?;
    let rules = RulesConfig::load_from_file(&cfg.rules_path)?;
    let client = build_http_client(cfg.http_timeout).context("building HTTP client")?;

    let providers: Vec<Box<dyn FeedProvider>> = feeds
        .iter()
        .map(|f| Box::new(FeedSource::from_descriptor(f, client.clone())) as Box<dyn FeedProvider>)
        .collect();
    tracing::info!(target: "pipeline", feeds = providers.len(), "daily run started");

    let engagement = fetch_engagement(&client, cfg.like_api_base.as_deref()).await;
    run_with_providers(now, &providers, &rules, &engagement, &cfg.out_dir).await
}
