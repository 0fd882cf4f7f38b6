// tests/config_files.rs
// The shipped sample configs must stay loadable.
use daily_digest::config::rules::{Category, RulesConfig};
use daily_digest::ingest::config::load_feeds_from;
use std::path::Path;

#[test]
fn sample_feed_list_loads_in_order() {
    let feeds = load_feeds_from(Path::new("config/feeds.toml")).expect("feeds.toml");
    assert!(feeds.len() >= 3);
    assert_eq!(feeds[0].name, "首相官邸");
    assert!(feeds.iter().all(|f| f.url.starts_with("https://")));
}

#[test]
fn sample_rules_load_and_validate() {
    let rules = RulesConfig::load_from_file(Path::new("config/rules.json")).expect("rules.json");
    assert!(rules.limits.min_total <= rules.limits.max_total);
    assert!(rules.hiring_tags.iter().any(|t| t == "hiring"));
    assert!(rules
        .category_rules
        .iter()
        .any(|r| r.category == Category::BJapan));
    assert!(rules.official_sources.iter().any(|s| s == "内閣府"));
}

#[test]
fn invalid_limits_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(
        &path,
        r#"
hiringTags = ["hiring"]

[limits]
minA = 3
minB = 3
minC = 3
minTotal = 4
maxTotal = 6
hiringCap = 0.5
"#,
    )
    .unwrap();
    assert!(RulesConfig::load_from_file(&path).is_err());
}
