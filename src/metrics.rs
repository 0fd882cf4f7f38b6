// src/metrics.rs
use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

/// One-time metrics registration (so series carry help text in the exposition).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_feeds_total", "Feeds fetched per run.");
        describe_counter!(
            "ingest_feed_errors_total",
            "Feeds skipped because of transport, status or parse errors."
        );
        describe_counter!("ingest_entries_total", "Entries parsed from feeds.");
        describe_counter!(
            "ingest_window_dropped_total",
            "Entries dropped for being older than the retention window."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Entries removed by normalized-title deduplication."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_counter!("select_picked_total", "Items published by the selector.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the curation pipeline last finished."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Dump the exposition text for a node-exporter style textfile collector.
    pub fn write_textfile(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create metrics dir {}", dir.display()))?;
        }
        std::fs::write(path, self.render())
            .with_context(|| format!("write metrics textfile {}", path.display()))
    }
}
