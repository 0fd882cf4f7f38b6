// src/config/mod.rs
//! Config file plumbing shared by the feed list and the rule set.
//!
//! Files are TOML or JSON. The extension is a hint; if the hinted format fails
//! the other one is tried before giving up.

pub mod rules;
pub mod runtime;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and deserialize a TOML or JSON config file.
pub fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_structured(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_structured<T: DeserializeOwned>(s: &str, hint_ext: &str) -> Result<T> {
    let try_toml_first = hint_ext == "toml";
    if try_toml_first {
        match toml::from_str::<T>(s) {
            Ok(v) => return Ok(v),
            Err(toml_err) => {
                return serde_json::from_str::<T>(s)
                    .map_err(|json_err| anyhow!("toml: {toml_err}; json: {json_err}"));
            }
        }
    }
    match serde_json::from_str::<T>(s) {
        Ok(v) => Ok(v),
        Err(json_err) => {
            toml::from_str::<T>(s).map_err(|toml_err| anyhow!("json: {json_err}; toml: {toml_err}"))
        }
    }
}

/// Resolve a config path: `$env_var` if set (must exist), else the first existing fallback.
pub fn resolve_path(env_var: &str, fallbacks: &[&str]) -> Result<PathBuf> {
    if let Ok(p) = std::env::var(env_var) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        bail!("{env_var} points to non-existent path {}", pb.display());
    }
    for candidate in fallbacks {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    bail!("no config found: set {env_var} or create one of {fallbacks:?}")
}
