//! Named sets of raw keywords that compile into a single filter rule.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::keyword::{FilterType, Keyword, KeywordError, NewKeyword, TargetField};
use crate::pattern::KeywordPatternBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordGroupError {
    #[error("keyword group name must be non-empty")]
    EmptyGroupName,

    #[error("keyword group must contain at least one keyword")]
    NoKeywordItems,

    #[error("duplicate keyword in group: '{0}'")]
    DuplicateKeyword(String),

    #[error("keyword must be non-empty")]
    EmptyKeyword,

    #[error("keyword '{0}' is not in the group")]
    KeywordNotFound(String),

    #[error(transparent)]
    Keyword(#[from] KeywordError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordItem {
    pub id: Uuid,
    pub group_id: Uuid,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`KeywordGroup::new`].
#[derive(Debug, Clone)]
pub struct NewKeywordGroup {
    pub id: Uuid,
    pub genre_id: Option<Uuid>,
    pub name: String,
    pub filter_type: FilterType,
    pub target_field: Option<TargetField>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub id: Uuid,
    pub genre_id: Option<Uuid>,
    pub name: String,
    pub filter_type: FilterType,
    pub target_field: TargetField,
    pub enabled: bool,
    pub description: Option<String>,
    items: Vec<KeywordItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl KeywordGroup {
    /// Create an enabled group. Keywords are trimmed and blanks dropped.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordGroupError::EmptyGroupName`],
    /// [`KeywordGroupError::DuplicateKeyword`], or
    /// [`KeywordGroupError::NoKeywordItems`] when nothing is left after
    /// trimming.
    pub fn new(input: NewKeywordGroup, now: DateTime<Utc>) -> Result<Self, KeywordGroupError> {
        if input.name.trim().is_empty() {
            return Err(KeywordGroupError::EmptyGroupName);
        }
        let items = build_items(input.id, &input.keywords, now)?;

        Ok(Self {
            id: input.id,
            genre_id: input.genre_id,
            name: input.name,
            filter_type: input.filter_type,
            target_field: input.target_field.unwrap_or_default(),
            enabled: true,
            description: input.description,
            items,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[KeywordItem] {
        &self.items
    }

    /// The group's keywords in insertion order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.keyword.as_str()).collect()
    }

    /// # Errors
    ///
    /// Returns [`KeywordGroupError::EmptyGroupName`] for a blank new name.
    pub fn update(
        &mut self,
        name: Option<String>,
        filter_type: Option<FilterType>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), KeywordGroupError> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(KeywordGroupError::EmptyGroupName);
            }
            self.name = name;
        }
        if let Some(filter_type) = filter_type {
            self.filter_type = filter_type;
        }
        if description.is_some() {
            self.description = description;
        }
        self.updated_at = Some(now);
        Ok(())
    }

    /// Replace every keyword in the group.
    ///
    /// # Errors
    ///
    /// Same as [`KeywordGroup::new`]; the group is unchanged on error.
    pub fn replace_keywords<S: AsRef<str>>(
        &mut self,
        keywords: &[S],
        now: DateTime<Utc>,
    ) -> Result<(), KeywordGroupError> {
        self.items = build_items(self.id, keywords, now)?;
        self.updated_at = Some(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`KeywordGroupError::EmptyKeyword`] or
    /// [`KeywordGroupError::DuplicateKeyword`].
    pub fn add_keyword(&mut self, keyword: &str, now: DateTime<Utc>) -> Result<(), KeywordGroupError> {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return Err(KeywordGroupError::EmptyKeyword);
        }
        if self.items.iter().any(|i| i.keyword == trimmed) {
            return Err(KeywordGroupError::DuplicateKeyword(trimmed.to_string()));
        }
        self.items.push(new_item(self.id, trimmed, now));
        self.updated_at = Some(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`KeywordGroupError::KeywordNotFound`], or
    /// [`KeywordGroupError::NoKeywordItems`] when it would remove the last
    /// keyword.
    pub fn remove_keyword(
        &mut self,
        keyword: &str,
        now: DateTime<Utc>,
    ) -> Result<(), KeywordGroupError> {
        let trimmed = keyword.trim();
        let Some(pos) = self.items.iter().position(|i| i.keyword == trimmed) else {
            return Err(KeywordGroupError::KeywordNotFound(trimmed.to_string()));
        };
        if self.items.len() == 1 {
            return Err(KeywordGroupError::NoKeywordItems);
        }
        self.items.remove(pos);
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn enable(&mut self, now: DateTime<Utc>) {
        self.enabled = true;
        self.updated_at = Some(now);
    }

    pub fn disable(&mut self, now: DateTime<Utc>) {
        self.enabled = false;
        self.updated_at = Some(now);
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = Some(now);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.deleted_at.is_none()
    }

    /// Materialize the group as a filter keyword whose pattern is generated
    /// from the group's keywords. Enabled/deleted state carries over.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::EmptyPattern`] (wrapped) if every keyword
    /// expands to nothing.
    pub fn to_keyword(
        &self,
        builder: &KeywordPatternBuilder,
        now: DateTime<Utc>,
    ) -> Result<Keyword, KeywordGroupError> {
        let mut keyword = Keyword::new(
            NewKeyword {
                id: self.id,
                genre_id: self.genre_id,
                name: self.name.clone(),
                filter_type: self.filter_type,
                pattern: builder.generate_pattern(&self.keywords()),
                target_field: Some(self.target_field),
                description: self.description.clone(),
            },
            now,
        )?;
        keyword.enabled = self.enabled;
        keyword.deleted_at = self.deleted_at;
        Ok(keyword)
    }
}

/// Generated patterns of every active group, bucketed by filter type.
/// Groups whose pattern comes out empty are skipped.
#[must_use]
pub fn patterns_by_filter_type(
    groups: &[KeywordGroup],
    builder: &KeywordPatternBuilder,
) -> BTreeMap<FilterType, Vec<String>> {
    let mut out: BTreeMap<FilterType, Vec<String>> = BTreeMap::new();
    for group in groups.iter().filter(|g| g.is_active()) {
        let pattern = builder.generate_pattern(&group.keywords());
        if !pattern.is_empty() {
            out.entry(group.filter_type).or_default().push(pattern);
        }
    }
    out
}

fn new_item(group_id: Uuid, keyword: &str, now: DateTime<Utc>) -> KeywordItem {
    KeywordItem {
        id: Uuid::new_v4(),
        group_id,
        keyword: keyword.to_string(),
        created_at: now,
    }
}

fn build_items<S: AsRef<str>>(
    group_id: Uuid,
    keywords: &[S],
    now: DateTime<Utc>,
) -> Result<Vec<KeywordItem>, KeywordGroupError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let trimmed = keyword.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.insert(trimmed) {
            return Err(KeywordGroupError::DuplicateKeyword(trimmed.to_string()));
        }
        items.push(new_item(group_id, trimmed, now));
    }

    if items.is_empty() {
        return Err(KeywordGroupError::NoKeywordItems);
    }
    Ok(items)
}
