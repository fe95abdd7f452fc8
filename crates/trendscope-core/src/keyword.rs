use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword name must be non-empty")]
    EmptyName,

    #[error("keyword pattern must be non-empty")]
    EmptyPattern,

    #[error("invalid filter type: '{0}'; must be include or exclude")]
    InvalidFilterType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Include,
    Exclude,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::Include => write!(f, "include"),
            FilterType::Exclude => write!(f, "exclude"),
        }
    }
}

impl FromStr for FilterType {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include" => Ok(FilterType::Include),
            "exclude" => Ok(FilterType::Exclude),
            _ => Err(KeywordError::InvalidFilterType(s.to_string())),
        }
    }
}

/// Which part of a video a keyword is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetField {
    #[default]
    Title,
    Description,
}

/// Input for [`Keyword::new`].
#[derive(Debug, Clone)]
pub struct NewKeyword {
    pub id: Uuid,
    pub genre_id: Option<Uuid>,
    pub name: String,
    pub filter_type: FilterType,
    pub pattern: String,
    pub target_field: Option<TargetField>,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct KeywordUpdate {
    pub name: Option<String>,
    pub filter_type: Option<FilterType>,
    pub pattern: Option<String>,
    pub description: Option<String>,
}

/// An include/exclude rule evaluated by the trending filter.
///
/// Keywords are soft-deleted only; a disabled or deleted keyword keeps its
/// record but drops out of filter evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: Uuid,
    pub genre_id: Option<Uuid>,
    pub name: String,
    pub filter_type: FilterType,
    pub pattern: String,
    pub target_field: TargetField,
    pub enabled: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Keyword {
    /// Create an enabled keyword.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::EmptyName`] or [`KeywordError::EmptyPattern`]
    /// when the respective field is blank.
    pub fn new(input: NewKeyword, now: DateTime<Utc>) -> Result<Self, KeywordError> {
        if input.name.trim().is_empty() {
            return Err(KeywordError::EmptyName);
        }
        if input.pattern.trim().is_empty() {
            return Err(KeywordError::EmptyPattern);
        }

        Ok(Self {
            id: input.id,
            genre_id: input.genre_id,
            name: input.name,
            filter_type: input.filter_type,
            pattern: input.pattern,
            target_field: input.target_field.unwrap_or_default(),
            enabled: true,
            description: input.description,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        })
    }

    /// Apply a partial update. Nothing is changed if any field is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::EmptyName`] or [`KeywordError::EmptyPattern`].
    pub fn update(&mut self, update: KeywordUpdate, now: DateTime<Utc>) -> Result<(), KeywordError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(KeywordError::EmptyName);
        }
        if update
            .pattern
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(KeywordError::EmptyPattern);
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(filter_type) = update.filter_type {
            self.filter_type = filter_type;
        }
        if let Some(pattern) = update.pattern {
            self.pattern = pattern;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
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
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the keyword takes part in filtering: enabled and not deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    fn input() -> NewKeyword {
        NewKeyword {
            id: Uuid::new_v4(),
            genre_id: None,
            name: "Frontend".to_string(),
            filter_type: FilterType::Include,
            pattern: "(?i)(react|vue)".to_string(),
            target_field: None,
            description: None,
        }
    }

    #[test]
    fn new_keyword_defaults() {
        let kw = Keyword::new(input(), now()).unwrap();
        assert!(kw.enabled);
        assert!(kw.is_active());
        assert_eq!(kw.target_field, TargetField::Title);
        assert_eq!(kw.created_at, now());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut i = input();
        i.name = "   ".to_string();
        assert_eq!(Keyword::new(i, now()).unwrap_err(), KeywordError::EmptyName);
    }

    #[test]
    fn blank_pattern_is_rejected() {
        let mut i = input();
        i.pattern = String::new();
        assert_eq!(
            Keyword::new(i, now()).unwrap_err(),
            KeywordError::EmptyPattern
        );
    }

    #[test]
    fn filter_type_parses_case_insensitively() {
        assert_eq!("Exclude".parse::<FilterType>().unwrap(), FilterType::Exclude);
        assert_eq!(" include ".parse::<FilterType>().unwrap(), FilterType::Include);
        assert_eq!(
            "block".parse::<FilterType>().unwrap_err(),
            KeywordError::InvalidFilterType("block".to_string())
        );
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut kw = Keyword::new(input(), now()).unwrap();
        let err = kw
            .update(
                KeywordUpdate {
                    name: Some("Renamed".to_string()),
                    pattern: Some(" ".to_string()),
                    ..KeywordUpdate::default()
                },
                now(),
            )
            .unwrap_err();
        assert_eq!(err, KeywordError::EmptyPattern);
        assert_eq!(kw.name, "Frontend");
        assert!(kw.updated_at.is_none());
    }

    #[test]
    fn update_applies_present_fields() {
        let mut kw = Keyword::new(input(), now()).unwrap();
        kw.update(
            KeywordUpdate {
                filter_type: Some(FilterType::Exclude),
                description: Some("spam".to_string()),
                ..KeywordUpdate::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(kw.filter_type, FilterType::Exclude);
        assert_eq!(kw.description.as_deref(), Some("spam"));
        assert_eq!(kw.name, "Frontend");
        assert_eq!(kw.updated_at, Some(now()));
    }

    #[test]
    fn disable_and_delete_deactivate() {
        let mut kw = Keyword::new(input(), now()).unwrap();
        kw.disable(now());
        assert!(!kw.is_active());
        kw.enable(now());
        assert!(kw.is_active());
        kw.soft_delete(now());
        assert!(kw.is_deleted());
        assert!(!kw.is_active());
    }
}
