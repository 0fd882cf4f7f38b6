// src/config/rules.rs
//! Rule configuration: tag rules, category rules, source weights, hiring tags and
//! selection limits.
//!
//! JSON shape (TOML equivalent accepted):
//! ```json
//! {
//!   "tagRules":      [{ "tag": "layoffs", "keywords": ["layoff", "人員削減"] }],
//!   "categoryRules": [{ "category": "B_JAPAN", "keywords": ["日本", "政府"] }],
//!   "sourceWeights": { "Reuters": 1.2 },
//!   "hiringTags":    ["hiring", "layoffs"],
//!   "limits": { "minA": 3, "minB": 3, "minC": 3, "minTotal": 10, "maxTotal": 15, "hiringCap": 0.4 },
//!   "officialSources": ["首相官邸", "内閣府"]
//! }
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::source_weights::SourceWeights;

/// Sources whose items are always filed under `B_JAPAN`.
pub const DEFAULT_OFFICIAL_SOURCES: [&str; 2] = ["首相官邸", "内閣府"];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "A_GLOBAL")]
    AGlobal,
    #[serde(rename = "B_JAPAN")]
    BJapan,
    #[default]
    #[serde(rename = "C_BIZ_AI")]
    CBizAi,
}

impl Category {
    /// Floor order used by the selector.
    pub const ALL: [Category; 3] = [Category::AGlobal, Category::BJapan, Category::CBizAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AGlobal => "A_GLOBAL",
            Category::BJapan => "B_JAPAN",
            Category::CBizAi => "C_BIZ_AI",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub min_a: usize,
    pub min_b: usize,
    pub min_c: usize,
    pub min_total: usize,
    pub max_total: usize,
    /// Max share of hiring-tagged items during the capped fill, in [0, 1].
    pub hiring_cap: f64,
}

impl Limits {
    pub fn min_for(&self, category: Category) -> usize {
        match category {
            Category::AGlobal => self.min_a,
            Category::BJapan => self.min_b,
            Category::CBizAi => self.min_c,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_total > self.max_total {
            bail!(
                "limits: minTotal ({}) exceeds maxTotal ({})",
                self.min_total,
                self.max_total
            );
        }
        let floors = self.min_a + self.min_b + self.min_c;
        if floors > self.max_total {
            bail!(
                "limits: category floors sum to {floors}, above maxTotal ({})",
                self.max_total
            );
        }
        if !(0.0..=1.0).contains(&self.hiring_cap) {
            bail!("limits: hiringCap {} outside [0, 1]", self.hiring_cap);
        }
        Ok(())
    }
}

fn default_official_sources() -> Vec<String> {
    DEFAULT_OFFICIAL_SOURCES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    #[serde(default)]
    pub tag_rules: Vec<TagRule>,
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
    #[serde(default)]
    pub source_weights: SourceWeights,
    #[serde(default)]
    pub hiring_tags: Vec<String>,
    pub limits: Limits,
    #[serde(default = "default_official_sources")]
    pub official_sources: Vec<String>,
}

impl RulesConfig {
    /// Load and validate. Any problem here is fatal for the run.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let cfg: RulesConfig = super::load_structured(path)?;
        cfg.limits.validate()?;
        tracing::info!(
            target: "config",
            path = %path.display(),
            tag_rules = cfg.tag_rules.len(),
            category_rules = cfg.category_rules.len(),
            hiring_tags = cfg.hiring_tags.len(),
            "rules loaded"
        );
        Ok(cfg)
    }

    pub fn is_hiring(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.hiring_tags.iter().any(|h| h == t))
    }
}
