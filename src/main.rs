//! daily-digest: batch entrypoint.
//! Fetches the configured feeds once, curates them and writes the site data files.

use anyhow::Context;
use daily_digest::config::runtime::RuntimeConfig;
use daily_digest::metrics::Metrics;
use daily_digest::pipeline::run_daily;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_LOG_JSON: &str = "DIGEST_LOG_JSON";
const DEFAULT_LOG_FILTER: &str =
    "daily_digest=info,ingest=info,engagement=info,config=info,classify=info,tag_weights=info,scoring=info,select=info,pipeline=info,warn";

/// Compact logs by default; one JSON object per line when `DIGEST_LOG_JSON=1`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(ENV_LOG_JSON).is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local runs; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RuntimeConfig::from_env().context("loading runtime config")?;
    let metrics = Metrics::init()?;

    let out = run_daily(&cfg).await?;
    tracing::info!(
        selected = out.counts.selected,
        tags = out.next_weights.len(),
        out_dir = %cfg.out_dir.display(),
        "daily digest built"
    );

    if let Some(path) = &cfg.metrics_textfile {
        metrics.write_textfile(path)?;
    }
    Ok(())
}
