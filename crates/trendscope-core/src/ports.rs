//! Seams to the systems around the engine: video and keyword sources, the
//! idempotent task queue, and the statistics fetcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CatalogError, QueueError};
use crate::keyword::Keyword;
use crate::snapshot::SnapshotCounts;
use crate::video::Video;

/// A video offered for admission into the trending pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub youtube_video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

pub trait VideoSource {
    /// Tracked, non-deleted videos published at or after `published_since`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backing store cannot be read.
    fn list_active(&self, published_since: DateTime<Utc>) -> Result<Vec<Video>, CatalogError>;

    /// Candidates for the trending filter.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backing store cannot be read.
    fn list_candidates(&self) -> Result<Vec<CandidateVideo>, CatalogError>;
}

pub trait KeywordSource {
    /// The keyword set to filter with. Implementations may include inactive
    /// keywords; the filter skips them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backing store cannot be read.
    fn keywords(&self) -> Result<Vec<Keyword>, CatalogError>;
}

/// Result of handing a task to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Created,
    /// A task with the same name was already queued; nothing changed.
    AlreadyExists,
}

/// A delayed task queue that deduplicates by task name.
pub trait TaskQueue {
    /// Queue `task_id` to fire at `eta`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue cannot record the task.
    fn schedule(&mut self, task_id: &str, eta: DateTime<Utc>)
        -> Result<DispatchOutcome, QueueError>;

    /// Drop a queued task. Returns `false` if no such task was queued.
    ///
    /// The name stays reserved: scheduling it again is
    /// [`DispatchOutcome::AlreadyExists`] until it is pruned.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue cannot be updated.
    fn cancel(&mut self, task_id: &str) -> Result<bool, QueueError>;

    /// Forget every task, queued or cancelled, whose eta is before `before`.
    /// Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue cannot be updated.
    fn prune(&mut self, before: DateTime<Utc>) -> Result<usize, QueueError>;
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics unavailable for video {video}: {reason}")]
    Unavailable { video: String, reason: String },
}

/// Fetches current counts for a YouTube video.
pub trait StatsSource {
    /// # Errors
    ///
    /// Returns [`StatsError`] if the counts cannot be fetched.
    fn video_statistics(&self, youtube_video_id: &str) -> Result<SnapshotCounts, StatsError>;
}
