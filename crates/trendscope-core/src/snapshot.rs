//! Captured video statistics at one checkpoint.
//!
//! A [`VideoSnapshot`] only exists once every invariant has been checked;
//! after construction it is never mutated or re-validated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::checkpoint::CheckpointHour;
use crate::video::Video;

/// Where the statistics behind a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    WebSub,
    Task,
    Manual,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::WebSub => write!(f, "websub"),
            SnapshotSource::Task => write!(f, "task"),
            SnapshotSource::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for SnapshotSource {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "websub" => Ok(SnapshotSource::WebSub),
            "task" => Ok(SnapshotSource::Task),
            "manual" => Ok(SnapshotSource::Manual),
            other => Err(SnapshotError::InvalidSource(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCounts {
    pub views: i64,
    pub likes: i64,
    pub subscriptions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("invalid checkpoint hour: {0}")]
    InvalidCheckpoint(i64),

    #[error("measured_at {measured_at} is after the current time {now}")]
    InvalidMeasuredAt {
        measured_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("invalid snapshot source: '{0}'")]
    InvalidSource(String),

    #[error("measured_at {measured_at} is before the video was published at {published_at}")]
    MeasuredBeforePublished {
        measured_at: DateTime<Utc>,
        published_at: DateTime<Utc>,
    },
}

/// Unvalidated snapshot input as handed over by the stats fetcher.
#[derive(Debug, Clone)]
pub struct SnapshotDraft {
    pub id: Uuid,
    pub video_id: Uuid,
    pub checkpoint_hour: i64,
    pub measured_at: DateTime<Utc>,
    pub counts: SnapshotCounts,
    pub source: String,
}

/// Serialized as a flat record; deserializing runs the same checks as
/// [`VideoSnapshot::new`] against the record's own `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct VideoSnapshot {
    id: Uuid,
    video_id: Uuid,
    checkpoint_hour: CheckpointHour,
    measured_at: DateTime<Utc>,
    counts: SnapshotCounts,
    source: SnapshotSource,
    created_at: DateTime<Utc>,
}

impl VideoSnapshot {
    /// Validate a draft that is not yet tied to a loaded video.
    ///
    /// Checks run in order: checkpoint, measurement time, source.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`SnapshotError`].
    pub fn new(draft: SnapshotDraft, now: DateTime<Utc>) -> Result<Self, SnapshotError> {
        let checkpoint_hour = CheckpointHour::from_hours(draft.checkpoint_hour)
            .ok_or(SnapshotError::InvalidCheckpoint(draft.checkpoint_hour))?;

        if draft.measured_at > now {
            return Err(SnapshotError::InvalidMeasuredAt {
                measured_at: draft.measured_at,
                now,
            });
        }

        let source = draft.source.parse::<SnapshotSource>()?;

        Ok(Self {
            id: draft.id,
            video_id: draft.video_id,
            checkpoint_hour,
            measured_at: draft.measured_at,
            counts: draft.counts,
            source,
            created_at: now,
        })
    }

    /// Validate a draft for a known video, adding the publish-time check
    /// after the standalone ones.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`SnapshotError`].
    pub fn new_for_video(
        draft: SnapshotDraft,
        video: &Video,
        now: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        let snapshot = Self::new(draft, now)?;
        snapshot.check_published(video)?;
        Ok(snapshot)
    }

    /// Reject a measurement taken before the video existed.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::MeasuredBeforePublished`].
    pub fn check_published(&self, video: &Video) -> Result<(), SnapshotError> {
        if self.measured_at < video.published_at {
            return Err(SnapshotError::MeasuredBeforePublished {
                measured_at: self.measured_at,
                published_at: video.published_at,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn video_id(&self) -> Uuid {
        self.video_id
    }

    #[must_use]
    pub fn checkpoint_hour(&self) -> CheckpointHour {
        self.checkpoint_hour
    }

    #[must_use]
    pub fn measured_at(&self) -> DateTime<Utc> {
        self.measured_at
    }

    #[must_use]
    pub fn counts(&self) -> SnapshotCounts {
        self.counts
    }

    #[must_use]
    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Wire form of a [`VideoSnapshot`] read back from storage.
#[derive(Deserialize)]
struct SnapshotRecord {
    id: Uuid,
    video_id: Uuid,
    checkpoint_hour: i64,
    measured_at: DateTime<Utc>,
    counts: SnapshotCounts,
    source: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRecord> for VideoSnapshot {
    type Error = SnapshotError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let draft = SnapshotDraft {
            id: record.id,
            video_id: record.video_id,
            checkpoint_hour: record.checkpoint_hour,
            measured_at: record.measured_at,
            counts: record.counts,
            source: record.source,
        };
        Self::new(draft, record.created_at)
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
