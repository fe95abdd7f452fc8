//! Include/exclude classification of candidate video titles.
//!
//! Exclude rules always win over include rules. A keyword whose pattern does
//! not compile is logged and treated as a non-match; it never aborts the pass.

use regex::Regex;
use serde::Serialize;

use crate::keyword::{FilterType, Keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterResult {
    Neutral,
    Include,
    Exclude,
}

impl FilterResult {
    /// Whether a candidate with this result enters the trending pipeline.
    #[must_use]
    pub fn admits(self) -> bool {
        !matches!(self, FilterResult::Exclude)
    }
}

impl std::fmt::Display for FilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterResult::Neutral => write!(f, "neutral"),
            FilterResult::Include => write!(f, "include"),
            FilterResult::Exclude => write!(f, "exclude"),
        }
    }
}

/// Stateless filter that compiles each keyword pattern on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendingFilter;

impl TrendingFilter {
    #[must_use]
    pub fn filter(&self, title: &str, keywords: &[Keyword]) -> FilterResult {
        let normalized = title.to_lowercase();
        let active: Vec<&Keyword> = keywords.iter().filter(|k| k.is_active()).collect();

        for filter_type in [FilterType::Exclude, FilterType::Include] {
            let matched = active
                .iter()
                .filter(|k| k.filter_type == filter_type)
                .any(|k| compile(k).is_some_and(|re| re.is_match(&normalized)));
            if matched {
                return result_for(filter_type);
            }
        }
        FilterResult::Neutral
    }
}

/// Active keywords compiled once, for classifying many titles.
#[derive(Debug, Clone, Default)]
pub struct CompiledKeywordSet {
    excludes: Vec<Regex>,
    includes: Vec<Regex>,
}

impl CompiledKeywordSet {
    /// Compile every active keyword, keeping supplied order within each
    /// filter type. Patterns that fail to compile are logged and dropped.
    #[must_use]
    pub fn compile(keywords: &[Keyword]) -> Self {
        let mut set = Self::default();
        for keyword in keywords.iter().filter(|k| k.is_active()) {
            let Some(re) = compile(keyword) else {
                continue;
            };
            match keyword.filter_type {
                FilterType::Exclude => set.excludes.push(re),
                FilterType::Include => set.includes.push(re),
            }
        }
        set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.excludes.len() + self.includes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn classify(&self, title: &str) -> FilterResult {
        let normalized = title.to_lowercase();
        if self.excludes.iter().any(|re| re.is_match(&normalized)) {
            FilterResult::Exclude
        } else if self.includes.iter().any(|re| re.is_match(&normalized)) {
            FilterResult::Include
        } else {
            FilterResult::Neutral
        }
    }
}

fn result_for(filter_type: FilterType) -> FilterResult {
    match filter_type {
        FilterType::Include => FilterResult::Include,
        FilterType::Exclude => FilterResult::Exclude,
    }
}

fn compile(keyword: &Keyword) -> Option<Regex> {
    match Regex::new(&keyword.pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(
                keyword = %keyword.name,
                keyword_id = %keyword.id,
                error = %e,
                "filter: keyword pattern does not compile; treating as non-match"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
