//! Keyword-rule classifier.
//!
//! Both rule sets are ordered `(keywords, label)` tables matched against
//! `title + " " + description`, case-insensitively, by plain substring.
//! - tag rules: every matching rule attaches its tag (once)
//! - category rules: first matching rule wins, default `C_BIZ_AI`
//! - official sources are forced to `B_JAPAN` after the rules ran

use crate::config::rules::{Category, RulesConfig};
use crate::ingest::types::CandidateItem;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedItem {
    pub item: CandidateItem,
    /// Rule order, no duplicates.
    pub tags: Vec<String>,
    pub category: Category,
}

#[derive(Debug, Clone)]
struct CompiledRule<L> {
    keywords: Vec<String>,
    label: L,
}

impl<L> CompiledRule<L> {
    fn new(keywords: &[String], label: L) -> Self {
        let keywords = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.to_lowercase())
            .collect();
        Self { keywords, label }
    }

    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Rule tables lowered once per run.
#[derive(Debug, Clone)]
pub struct Classifier {
    tag_rules: Vec<CompiledRule<String>>,
    category_rules: Vec<CompiledRule<Category>>,
    official_sources: Vec<String>,
}

impl Classifier {
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            tag_rules: rules
                .tag_rules
                .iter()
                .map(|r| CompiledRule::new(&r.keywords, r.tag.clone()))
                .collect(),
            category_rules: rules
                .category_rules
                .iter()
                .map(|r| CompiledRule::new(&r.keywords, r.category))
                .collect(),
            official_sources: rules.official_sources.clone(),
        }
    }

    pub fn tags_for(&self, haystack: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for rule in &self.tag_rules {
            if rule.matches(haystack) && !tags.contains(&rule.label) {
                tags.push(rule.label.clone());
            }
        }
        tags
    }

    pub fn category_for(&self, haystack: &str, source_name: &str) -> Category {
        if self.official_sources.iter().any(|s| s == source_name) {
            return Category::BJapan;
        }
        self.category_rules
            .iter()
            .find(|r| r.matches(haystack))
            .map(|r| r.label)
            .unwrap_or_default()
    }

    pub fn classify(&self, item: CandidateItem) -> ClassifiedItem {
        let haystack = format!("{} {}", item.title, item.description).to_lowercase();
        let tags = self.tags_for(&haystack);
        let category = self.category_for(&haystack, &item.source_name);
        tracing::trace!(target: "classify", id = %item.id, %category, tags = ?tags, "classified");
        ClassifiedItem {
            item,
            tags,
            category,
        }
    }

    pub fn classify_all(&self, items: Vec<CandidateItem>) -> Vec<ClassifiedItem> {
        items.into_iter().map(|it| self.classify(it)).collect()
    }
}
