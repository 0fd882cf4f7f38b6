//! Final selection in three phases, each appended after the previous one:
//!
//! 1. category floor : top `minA` / `minB` / `minC` of each category by score
//! 2. capped fill    : best remaining items up to `maxTotal`, skipping any item that
//!                     would push the hiring-tagged share above `hiringCap`
//! 3. backfill       : if still under `minTotal`, best remaining items, cap ignored
//!
//! Segments are never re-sorted together. Ties keep ingestion order. An item id
//! is picked at most once across all three phases.

use metrics::counter;
use std::collections::HashSet;

use crate::analyze::scoring::ScoredItem;
use crate::config::rules::{Category, Limits, RulesConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub items: Vec<ScoredItem>,
    /// Segment lengths, in output order.
    pub floor: usize,
    pub capped: usize,
    pub backfill: usize,
}

/// Indices of `pool`, best score first; stable for equal scores.
fn rank(pool: &[ScoredItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| pool[b].score.total_cmp(&pool[a].score));
    order
}

/// Top `min_for(cat)` of each category. An id already taken never fills a slot twice.
fn category_floor<'a>(
    pool: &'a [ScoredItem],
    ranked: &[usize],
    limits: &Limits,
    taken: &mut HashSet<&'a str>,
) -> Vec<usize> {
    let mut out = Vec::new();
    for cat in Category::ALL {
        let want = limits.min_for(cat);
        let mut got = 0;
        for &i in ranked {
            if got >= want {
                break;
            }
            if pool[i].item.category != cat || !taken.insert(pool[i].id()) {
                continue;
            }
            out.push(i);
            got += 1;
        }
    }
    out
}

fn capped_fill<'a>(
    pool: &'a [ScoredItem],
    ranked: &[usize],
    taken: &mut HashSet<&'a str>,
    mut picked: usize,
    mut hiring_picked: usize,
    limits: &Limits,
    is_hiring: impl Fn(usize) -> bool,
) -> Vec<usize> {
    let mut out = Vec::new();
    for &i in ranked {
        if picked >= limits.max_total {
            break;
        }
        if taken.contains(pool[i].id()) {
            continue;
        }
        let h = is_hiring(i);
        let share = (hiring_picked + usize::from(h)) as f64 / (picked + 1) as f64;
        if share > limits.hiring_cap {
            continue;
        }
        taken.insert(pool[i].id());
        out.push(i);
        picked += 1;
        hiring_picked += usize::from(h);
    }
    out
}

fn backfill<'a>(
    pool: &'a [ScoredItem],
    ranked: &[usize],
    taken: &mut HashSet<&'a str>,
    mut picked: usize,
    min_total: usize,
) -> Vec<usize> {
    let mut out = Vec::new();
    for &i in ranked {
        if picked >= min_total {
            break;
        }
        if !taken.insert(pool[i].id()) {
            continue;
        }
        out.push(i);
        picked += 1;
    }
    out
}

pub fn select(scored: Vec<ScoredItem>, rules: &RulesConfig) -> SelectionResult {
    let limits = &rules.limits;
    let ranked = rank(&scored);

    let (floor, capped, back) = {
        let is_hiring = |i: usize| rules.is_hiring(&scored[i].item.tags);
        // ids, not pool slots: two feeds can carry one link under different titles
        let mut taken: HashSet<&str> = HashSet::new();

        let floor = category_floor(&scored, &ranked, limits, &mut taken);
        let floor_hiring = floor.iter().filter(|&&i| is_hiring(i)).count();

        let capped = capped_fill(
            &scored,
            &ranked,
            &mut taken,
            floor.len(),
            floor_hiring,
            limits,
            is_hiring,
        );
        let filled = floor.len() + capped.len();
        let back = if filled < limits.min_total {
            backfill(&scored, &ranked, &mut taken, filled, limits.min_total)
        } else {
            Vec::new()
        };
        (floor, capped, back)
    };

    let (n_floor, n_capped, n_back) = (floor.len(), capped.len(), back.len());
    let mut slots: Vec<Option<ScoredItem>> = scored.into_iter().map(Some).collect();
    let items: Vec<ScoredItem> = floor
        .into_iter()
        .chain(capped)
        .chain(back)
        .filter_map(|i| slots[i].take())
        .collect();

    counter!("select_picked_total").increment(items.len() as u64);
    tracing::info!(
        target: "select",
        picked = items.len(),
        floor = n_floor,
        capped = n_capped,
        backfill = n_back,
        "selection done"
    );

    SelectionResult {
        items,
        floor: n_floor,
        capped: n_capped,
        backfill: n_back,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::classify::ClassifiedItem;
    use crate::ingest::types::{item_id, CandidateItem};
    use crate::source_weights::SourceWeights;

    fn rules(limits: Limits) -> RulesConfig {
        RulesConfig {
            tag_rules: vec![],
            category_rules: vec![],
            source_weights: SourceWeights::default(),
            hiring_tags: vec!["hiring".into()],
            limits,
            official_sources: vec![],
        }
    }

    fn limits(min: [usize; 3], min_total: usize, max_total: usize, cap: f64) -> Limits {
        Limits {
            min_a: min[0],
            min_b: min[1],
            min_c: min[2],
            min_total,
            max_total,
            hiring_cap: cap,
        }
    }

    fn scored(name: &str, category: Category, score: f64, hiring: bool) -> ScoredItem {
        let url = format!("https://x.test/{name}");
        ScoredItem {
            item: ClassifiedItem {
                item: CandidateItem {
                    id: item_id(&url),
                    title: name.into(),
                    url,
                    description: String::new(),
                    published_at: None,
                    source_name: "X".into(),
                },
                tags: if hiring { vec!["hiring".into()] } else { vec![] },
                category,
            },
            score,
        }
    }

    fn same_link(title: &str, link: &str, category: Category, score: f64) -> ScoredItem {
        let mut s = scored(title, category, score, false);
        s.item.item.url = link.into();
        s.item.item.id = item_id(link);
        s
    }

    fn titles(r: &SelectionResult) -> Vec<&str> {
        r.items.iter().map(|s| s.item.item.title.as_str()).collect()
    }

    #[test]
    fn floor_then_global_fill() {
        let pool = vec![
            scored("a1", Category::AGlobal, 1.0, false),
            scored("a2", Category::AGlobal, 5.0, false),
            scored("b1", Category::BJapan, 0.5, false),
            scored("c1", Category::CBizAi, 9.0, false),
            scored("c2", Category::CBizAi, 8.0, false),
        ];
        let r = select(pool, &rules(limits([1, 1, 1], 3, 4, 1.0)));
        assert_eq!(titles(&r), vec!["a2", "b1", "c1", "c2"]);
        assert_eq!((r.floor, r.capped, r.backfill), (3, 1, 0));
    }

    #[test]
    fn short_category_contributes_what_it_has() {
        let pool = vec![
            scored("c1", Category::CBizAi, 3.0, false),
            scored("c2", Category::CBizAi, 2.0, false),
        ];
        let r = select(pool, &rules(limits([2, 2, 1], 1, 5, 1.0)));
        assert_eq!(titles(&r), vec!["c1", "c2"]);
        assert_eq!(r.floor, 1);
    }

    #[test]
    fn hiring_cap_skips_and_backfill_restores_minimum() {
        let pool = vec![
            scored("h1", Category::CBizAi, 9.0, true),
            scored("h2", Category::CBizAi, 8.0, true),
            scored("h3", Category::CBizAi, 7.0, true),
            scored("n1", Category::CBizAi, 6.0, false),
        ];
        // cap 0.5: every hiring item alone would be 1/1, so only n1 survives the capped pass
        let r = select(pool, &rules(limits([0, 0, 0], 4, 4, 0.5)));
        assert_eq!(titles(&r), vec!["n1", "h1", "h2", "h3"]);
        assert_eq!((r.floor, r.capped, r.backfill), (0, 1, 3));
    }

    #[test]
    fn skipped_hiring_item_is_not_revisited() {
        let pool = vec![
            scored("n1", Category::CBizAi, 9.0, false),
            scored("h1", Category::CBizAi, 8.0, true),
            scored("h2", Category::CBizAi, 7.0, true),
            scored("n2", Category::CBizAi, 6.0, false),
        ];
        // h1 → 1/2 ok, h2 → 2/3 over cap, n2 → 1/3 ok; h2 stays out
        let r = select(pool, &rules(limits([0, 0, 0], 0, 4, 0.5)));
        assert_eq!(titles(&r), vec!["n1", "h1", "n2"]);
        assert_eq!(r.backfill, 0);
    }

    #[test]
    fn capped_pass_stops_at_max_total() {
        let pool: Vec<_> = (0..10)
            .map(|i| scored(&format!("c{i}"), Category::CBizAi, 10.0 - i as f64, false))
            .collect();
        let r = select(pool, &rules(limits([0, 0, 2], 3, 5, 1.0)));
        assert_eq!(r.items.len(), 5);
        assert_eq!(titles(&r), vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn equal_scores_keep_ingestion_order() {
        let pool = vec![
            scored("first", Category::AGlobal, 1.0, false),
            scored("second", Category::AGlobal, 1.0, false),
            scored("third", Category::AGlobal, 1.0, false),
        ];
        let r = select(pool, &rules(limits([0, 0, 0], 0, 2, 1.0)));
        assert_eq!(titles(&r), vec!["first", "second"]);
    }

    #[test]
    fn fewer_candidates_than_minimum_selects_all() {
        let pool = vec![
            scored("h1", Category::AGlobal, 2.0, true),
            scored("h2", Category::BJapan, 1.0, true),
        ];
        let r = select(pool, &rules(limits([0, 0, 0], 5, 8, 0.0)));
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.backfill, 2);
    }

    #[test]
    fn shared_link_is_published_once() {
        let link = "https://shared.test/story";
        let pool = vec![
            same_link("wire copy", link, Category::CBizAi, 3.0),
            same_link("rewritten headline", link, Category::CBizAi, 2.0),
            scored("other", Category::AGlobal, 1.0, false),
        ];
        let r = select(pool, &rules(limits([0, 0, 1], 2, 3, 1.0)));
        assert_eq!(titles(&r), vec!["wire copy", "other"]);
        assert_eq!((r.floor, r.capped, r.backfill), (1, 1, 0));
    }

    #[test]
    fn floor_skips_repeated_id_within_category() {
        let link = "https://shared.test/story";
        let pool = vec![
            same_link("first", link, Category::CBizAi, 5.0),
            same_link("second", link, Category::CBizAi, 4.0),
            scored("c2", Category::CBizAi, 3.0, false),
        ];
        let r = select(pool, &rules(limits([0, 0, 2], 0, 2, 1.0)));
        assert_eq!(titles(&r), vec!["first", "c2"]);
        assert_eq!(r.floor, 2);
    }

    #[test]
    fn backfill_never_repeats_an_id() {
        let link = "https://shared.test/story";
        let pool = vec![
            same_link("a", link, Category::AGlobal, 2.0),
            same_link("b", link, Category::BJapan, 1.0),
        ];
        let r = select(pool, &rules(limits([0, 0, 0], 2, 2, 0.0)));
        assert_eq!(titles(&r), vec!["a"]);
        assert_eq!(r.backfill, 0);
        assert_eq!(r.capped, 1);
    }
}
