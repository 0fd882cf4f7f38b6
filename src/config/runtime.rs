// src/config/runtime.rs
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_FEEDS_PATH: &str = "DIGEST_FEEDS_PATH";
pub const ENV_RULES_PATH: &str = "DIGEST_RULES_PATH";
pub const ENV_OUT_DIR: &str = "DIGEST_OUT_DIR";
pub const ENV_LIKE_API_BASE: &str = "LIKE_API_BASE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "DIGEST_HTTP_TIMEOUT_SECS";
pub const ENV_METRICS_TEXTFILE: &str = "DIGEST_METRICS_TEXTFILE";

pub const DEFAULT_OUT_DIR: &str = "site/data";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Everything the batch run needs from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub feeds_path: PathBuf,
    pub rules_path: PathBuf,
    pub out_dir: PathBuf,
    /// Base URL of the reaction service; `None` disables engagement lookup.
    pub like_api_base: Option<String>,
    pub http_timeout: Duration,
    pub metrics_textfile: Option<PathBuf>,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self> {
        let feeds_path = super::resolve_path(
            ENV_FEEDS_PATH,
            &["config/feeds.toml", "config/feeds.json"],
        )?;
        let rules_path = super::resolve_path(
            ENV_RULES_PATH,
            &["config/rules.toml", "config/rules.json"],
        )?;

        let out_dir = std::env::var(ENV_OUT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUT_DIR));

        let like_api_base = std::env::var(ENV_LIKE_API_BASE)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let http_timeout = Duration::from_secs(parse_timeout_env(
            std::env::var(ENV_HTTP_TIMEOUT_SECS).ok(),
        ));

        let metrics_textfile = std::env::var(ENV_METRICS_TEXTFILE)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            feeds_path,
            rules_path,
            out_dir,
            like_api_base,
            http_timeout,
            metrics_textfile,
        })
    }
}

// positive integer seconds, otherwise the default
fn parse_timeout_env(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
}
