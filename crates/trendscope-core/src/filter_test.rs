use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::*;
use crate::keyword::NewKeyword;
use crate::pattern::KeywordPatternBuilder;

fn keyword(name: &str, filter_type: FilterType, pattern: &str) -> Keyword {
    Keyword::new(
        NewKeyword {
            id: Uuid::new_v4(),
            genre_id: None,
            name: name.to_string(),
            filter_type,
            pattern: pattern.to_string(),
            target_field: None,
            description: None,
        },
        Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

fn rules() -> Vec<Keyword> {
    let builder = KeywordPatternBuilder::default();
    vec![
        keyword(
            "frameworks",
            FilterType::Include,
            &builder.generate_pattern(&["React", "Next.js"]),
        ),
        keyword(
            "news",
            FilterType::Exclude,
            &builder.generate_pattern(&["breaking"]),
        ),
    ]
}

#[test]
fn no_keywords_is_neutral() {
    assert_eq!(
        TrendingFilter.filter("anything at all", &[]),
        FilterResult::Neutral
    );
}

#[test]
fn include_match() {
    assert_eq!(
        TrendingFilter.filter("Next.js 15 deep dive", &rules()),
        FilterResult::Include
    );
}

#[test]
fn exclude_wins_over_include() {
    assert_eq!(
        TrendingFilter.filter("Breaking: React 19 released", &rules()),
        FilterResult::Exclude
    );
}

#[test]
fn exclude_wins_regardless_of_order() {
    let mut reversed = rules();
    reversed.reverse();
    assert_eq!(
        TrendingFilter.filter("Breaking: React 19 released", &reversed),
        FilterResult::Exclude
    );
}

#[test]
fn unmatched_title_is_neutral() {
    assert_eq!(
        TrendingFilter.filter("Cooking pasta at home", &rules()),
        FilterResult::Neutral
    );
}

#[test]
fn title_is_lowercased_before_matching() {
    let rules = vec![keyword("plain", FilterType::Include, "rust")];
    assert_eq!(
        TrendingFilter.filter("RUST 2026 roadmap", &rules),
        FilterResult::Include
    );
}

#[test]
fn disabled_keywords_are_ignored() {
    let now = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
    let mut rules = rules();
    for k in &mut rules {
        k.disable(now);
    }
    assert_eq!(
        TrendingFilter.filter("Breaking: React 19 released", &rules),
        FilterResult::Neutral
    );
}

#[test]
fn deleted_keywords_are_ignored() {
    let now = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
    let mut rules = rules();
    rules[1].soft_delete(now);
    assert_eq!(
        TrendingFilter.filter("Breaking: React 19 released", &rules),
        FilterResult::Include
    );
    rules[0].soft_delete(now);
    assert_eq!(
        TrendingFilter.filter("Breaking: React 19 released", &rules),
        FilterResult::Neutral
    );
}

#[test]
fn malformed_pattern_is_a_non_match() {
    let rules = vec![
        keyword("broken", FilterType::Exclude, "(unclosed"),
        keyword("ok", FilterType::Include, "(?i)react"),
    ];
    assert_eq!(
        TrendingFilter.filter("React hooks explained", &rules),
        FilterResult::Include
    );
}

#[test]
fn compiled_set_agrees_with_filter() {
    let mut rules = rules();
    rules.push(keyword("broken", FilterType::Include, "[z-a]"));
    let set = CompiledKeywordSet::compile(&rules);
    assert_eq!(set.len(), 2);

    for title in [
        "Breaking: React 19 released",
        "Next.js 15 deep dive",
        "Cooking pasta at home",
    ] {
        assert_eq!(set.classify(title), TrendingFilter.filter(title, &rules));
    }
}

#[test]
fn compiled_set_skips_inactive_keywords() {
    let now = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
    let mut rules = rules();
    rules[0].disable(now);
    let set = CompiledKeywordSet::compile(&rules);
    assert_eq!(set.len(), 1);
    assert_eq!(set.classify("React tips"), FilterResult::Neutral);
}

#[test]
fn admits_everything_but_exclude() {
    assert!(FilterResult::Neutral.admits());
    assert!(FilterResult::Include.admits());
    assert!(!FilterResult::Exclude.admits());
}
