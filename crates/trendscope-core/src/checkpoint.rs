//! The fixed calendar of statistic-capture offsets.
//!
//! Every other module asks this one which offsets exist; nothing else
//! hard-codes the set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hours after publication at which a snapshot is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub enum CheckpointHour {
    H0,
    H3,
    H6,
    H12,
    H24,
    H48,
    H72,
    H168,
}

/// Every checkpoint, ascending by hour.
pub const ALL_CHECKPOINTS: [CheckpointHour; 8] = [
    CheckpointHour::H0,
    CheckpointHour::H3,
    CheckpointHour::H6,
    CheckpointHour::H12,
    CheckpointHour::H24,
    CheckpointHour::H48,
    CheckpointHour::H72,
    CheckpointHour::H168,
];

impl CheckpointHour {
    /// Offset from publication in whole hours.
    #[must_use]
    pub const fn hours(self) -> u32 {
        match self {
            CheckpointHour::H0 => 0,
            CheckpointHour::H3 => 3,
            CheckpointHour::H6 => 6,
            CheckpointHour::H12 => 12,
            CheckpointHour::H24 => 24,
            CheckpointHour::H48 => 48,
            CheckpointHour::H72 => 72,
            CheckpointHour::H168 => 168,
        }
    }

    /// Look up the checkpoint for a raw hour count, `None` when the value is
    /// not one of the calendar offsets.
    #[must_use]
    pub fn from_hours(hours: i64) -> Option<Self> {
        ALL_CHECKPOINTS
            .iter()
            .copied()
            .find(|cp| i64::from(cp.hours()) == hours)
    }
}

impl fmt::Display for CheckpointHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hours())
    }
}

impl TryFrom<i64> for CheckpointHour {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_hours(value).ok_or_else(|| format!("{value} is not a valid checkpoint hour"))
    }
}

impl From<CheckpointHour> for u32 {
    fn from(value: CheckpointHour) -> Self {
        value.hours()
    }
}

#[must_use]
pub fn all_checkpoints() -> &'static [CheckpointHour] {
    &ALL_CHECKPOINTS
}

/// Checkpoints strictly later than `hour`, ascending.
#[must_use]
pub fn checkpoints_after(hour: CheckpointHour) -> Vec<CheckpointHour> {
    ALL_CHECKPOINTS
        .iter()
        .copied()
        .filter(|cp| *cp > hour)
        .collect()
}

#[must_use]
pub fn is_valid(hours: i64) -> bool {
    CheckpointHour::from_hours(hours).is_some()
}
