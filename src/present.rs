//! Presenter: selected items → the JSON documents consumed by the static site.
//!
//! Every timestamp is rendered at a fixed UTC+9 offset as `YYYY-MM-DD HH:MM JST`.
//! Summaries are fixed templates filled from feed text, nothing is generated.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::scoring::ScoredItem;
use crate::analyze::select::SelectionResult;
use crate::analyze::tag_weights::TagWeightTable;
use crate::config::rules::Category;
use crate::ingest::types::short_hash;

const JST_OFFSET_HOURS: i64 = 9;
const SHORT_SUMMARY_CHARS: usize = 70;
const FULL_SUMMARY_CHARS: usize = 280;

const SHORT_SUMMARY_FALLBACK: &str = "要点は出典リンク参照（公式・一次情報優先）";
const OVERVIEW_FALLBACK: &str = "（RSSの概要情報が短いため、要点のみ表示）";
const PUBLISHED_FALLBACK: &str = "不明（RSSに日時が無い/取得不可）";
const RULE_LINE: &str = "――――――――――";

const IMPLICATIONS: [&str; 3] = [
    "求人広告：景況/規制/AI動向に応じて、配分・訴求軸（給与/働き方/スキル）を微調整する",
    "AI面接：ルール・ガイドライン動向を追い、説明可能性/公平性を担保した導入提案を前提にする",
    "BPO：コスト圧力が強い局面ほど、非コア業務の外出し＋自動化で“採用に集中”を作る",
];

const POINT_LABELS: [&str; 3] = ["最重要", "次点", "注目"];

fn jst_naive(dt: DateTime<Utc>) -> NaiveDateTime {
    dt.naive_utc() + Duration::hours(JST_OFFSET_HOURS)
}

/// `YYYY-MM-DD HH:MM JST`
pub fn format_jst(dt: DateTime<Utc>) -> String {
    jst_naive(dt).format("%Y-%m-%d %H:%M JST").to_string()
}

/// Calendar day in JST, `YYYY-MM-DD`.
pub fn date_key_jst(dt: DateTime<Utc>) -> String {
    jst_naive(dt).format("%Y-%m-%d").to_string()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn summary_short(description: &str) -> String {
    let text = collapse_ws(description);
    if text.is_empty() {
        return SHORT_SUMMARY_FALLBACK.to_string();
    }
    if text.chars().count() > SHORT_SUMMARY_CHARS {
        let mut out: String = text.chars().take(SHORT_SUMMARY_CHARS).collect();
        out.push('…');
        out
    } else {
        text
    }
}

pub fn summary_full(
    title: &str,
    description: &str,
    source_name: &str,
    published_at_jst: Option<&str>,
) -> String {
    let overview: String = collapse_ws(description)
        .chars()
        .take(FULL_SUMMARY_CHARS)
        .collect();
    let overview = if overview.is_empty() {
        OVERVIEW_FALLBACK.to_string()
    } else {
        overview
    };

    [
        RULE_LINE.to_string(),
        format!("📰 {title}"),
        String::new(),
        "■ 概要（3行以内）".to_string(),
        format!("・{overview}"),
        "・（出典リンク参照：一次情報/公式発表を優先）".to_string(),
        String::new(),
        "■ 背景・補足".to_string(),
        format!("・公開元：{source_name}"),
        format!("・公開日時：{}", published_at_jst.unwrap_or(PUBLISHED_FALLBACK)),
        String::new(),
        "■ ビジネス／採用への示唆".to_string(),
        "・顧客提案：『影響領域（賃金/規制/AI/景況）』と『次アクション（集客/自動化/運用最適化）』を会話の起点にする".to_string(),
        "・社内戦略：類似ニュースの継続ウォッチ（翌日以降の追加報道/公式発表）を前提に、施策の優先度を見直す".to_string(),
        RULE_LINE.to_string(),
    ]
    .join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub source_name: String,
    pub published_at_jst: Option<String>,
    pub summary_short: String,
    pub summary_full: String,
    pub sources: Vec<SourceLink>,
}

impl ItemView {
    pub fn from_scored(s: &ScoredItem) -> Self {
        let it = &s.item.item;
        let published_at_jst = it.published_at.map(format_jst);
        Self {
            id: it.id.clone(),
            title: it.title.clone(),
            category: s.item.category,
            tags: s.item.tags.clone(),
            source_name: it.source_name.clone(),
            summary_short: summary_short(&it.description),
            summary_full: summary_full(
                &it.title,
                &it.description,
                &it.source_name,
                published_at_jst.as_deref(),
            ),
            published_at_jst,
            sources: vec![SourceLink {
                name: it.source_name.clone(),
                url: it.url.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsDocument {
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub source_name: String,
    pub summary_short: String,
    pub published_at_jst: Option<String>,
}

impl From<&ItemView> for ArticleView {
    fn from(v: &ItemView) -> Self {
        Self {
            id: v.id.clone(),
            title: v.title.clone(),
            category: v.category,
            tags: v.tags.clone(),
            source_name: v.source_name.clone(),
            summary_short: v.summary_short.clone(),
            published_at_jst: v.published_at_jst.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayDocument {
    pub date_key: String,
    pub important_points: Vec<String>,
    pub implications: Vec<String>,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWeightsDocument {
    pub updated_at_jst: String,
    pub weights: TagWeightTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMeta {
    pub built_at_jst: String,
    pub build_id: String,
}

/// Everything one run publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestDocuments {
    pub items: ItemsDocument,
    pub today: TodayDocument,
    pub tag_weights: TagWeightsDocument,
    pub meta: BuildMeta,
}

fn important_points(items: &[ItemView]) -> Vec<String> {
    items
        .iter()
        .zip(POINT_LABELS)
        .map(|(it, label)| format!("{label}：{}（{}）", it.title, it.category))
        .collect()
}

pub fn render(
    selection: &SelectionResult,
    next_weights: &TagWeightTable,
    now: DateTime<Utc>,
) -> DigestDocuments {
    let items: Vec<ItemView> = selection.items.iter().map(ItemView::from_scored).collect();
    let stamp = format_jst(now);

    let today = TodayDocument {
        date_key: date_key_jst(now),
        important_points: important_points(&items),
        implications: IMPLICATIONS.iter().map(|s| s.to_string()).collect(),
        articles: items.iter().map(ArticleView::from).collect(),
    };

    DigestDocuments {
        today,
        items: ItemsDocument { items },
        tag_weights: TagWeightsDocument {
            updated_at_jst: stamp.clone(),
            weights: next_weights.clone(),
        },
        meta: BuildMeta {
            built_at_jst: stamp,
            build_id: short_hash(&now.timestamp_millis().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn jst_rendering_crosses_midnight() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 31, 16, 5, 59).unwrap();
        assert_eq!(format_jst(dt), "2026-01-01 01:05 JST");
        assert_eq!(date_key_jst(dt), "2026-01-01");
    }

    #[test]
    fn short_summary_truncates_by_chars() {
        let long = "あ".repeat(71);
        let s = summary_short(&long);
        assert_eq!(s.chars().count(), 71);
        assert!(s.ends_with('…'));

        let exact = "b".repeat(70);
        assert_eq!(summary_short(&exact), exact);
        assert_eq!(summary_short("  a \n b  "), "a b");
        assert_eq!(summary_short("   "), SHORT_SUMMARY_FALLBACK);
    }

    #[test]
    fn full_summary_template() {
        let s = summary_full("Title", "", "NHK", None);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[1], "📰 Title");
        assert_eq!(lines[4], format!("・{OVERVIEW_FALLBACK}"));
        assert_eq!(lines[8], "・公開元：NHK");
        assert_eq!(lines[9], format!("・公開日時：{PUBLISHED_FALLBACK}"));

        let with_date = summary_full("T", "desc", "NHK", Some("2025-01-01 09:00 JST"));
        assert!(with_date.contains("・desc\n"));
        assert!(with_date.contains("・公開日時：2025-01-01 09:00 JST"));
    }
}
