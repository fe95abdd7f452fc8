use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::snapshot::{SnapshotError, VideoSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    #[error("youtube video id must be non-empty")]
    EmptyYouTubeVideoId,

    #[error("youtube channel id must be non-empty")]
    EmptyChannelId,

    #[error("published_at {published_at} is in the future (now {now})")]
    PublishedInFuture {
        published_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("snapshot belongs to video {snapshot_video}, not {video}")]
    SnapshotVideoMismatch { video: Uuid, snapshot_video: Uuid },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Metadata reported by the video source for a newly discovered video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMeta {
    pub youtube_video_id: String,
    pub youtube_channel_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub youtube_video_id: String,
    pub channel_id: Option<Uuid>,
    pub youtube_channel_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Create a tracked video.
    ///
    /// # Errors
    ///
    /// Returns [`VideoError`] if either YouTube id is blank or the video was
    /// published after `now`.
    pub fn new(
        id: Uuid,
        channel_id: Option<Uuid>,
        meta: VideoMeta,
        now: DateTime<Utc>,
    ) -> Result<Self, VideoError> {
        if meta.youtube_video_id.trim().is_empty() {
            return Err(VideoError::EmptyYouTubeVideoId);
        }
        if meta.youtube_channel_id.trim().is_empty() {
            return Err(VideoError::EmptyChannelId);
        }
        if meta.published_at > now {
            return Err(VideoError::PublishedInFuture {
                published_at: meta.published_at,
                now,
            });
        }

        Ok(Self {
            id,
            youtube_video_id: meta.youtube_video_id,
            channel_id,
            youtube_channel_id: meta.youtube_channel_id,
            title: meta.title,
            published_at: meta.published_at,
            category_id: meta.category_id,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        })
    }

    pub fn rename(&mut self, title: impl Into<String>, now: DateTime<Utc>) {
        self.title = title.into();
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

    /// Check that `snapshot` belongs to this video and was measured after it
    /// was published, then queue it on `pending` for the next flush.
    ///
    /// # Errors
    ///
    /// Returns [`VideoError::SnapshotVideoMismatch`] or
    /// [`VideoError::Snapshot`] wrapping `MeasuredBeforePublished`.
    pub fn attach_snapshot(
        &self,
        snapshot: VideoSnapshot,
        pending: &mut PendingSnapshots,
    ) -> Result<(), VideoError> {
        if snapshot.video_id() != self.id {
            return Err(VideoError::SnapshotVideoMismatch {
                video: self.id,
                snapshot_video: snapshot.video_id(),
            });
        }
        snapshot.check_published(self)?;
        pending.items.push(snapshot);
        Ok(())
    }
}

/// Snapshots captured but not yet handed to persistence.
#[derive(Debug, Default)]
pub struct PendingSnapshots {
    items: Vec<VideoSnapshot>,
}

impl PendingSnapshots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoSnapshot> {
        self.items.iter()
    }

    /// Hand every pending snapshot to `persist` and clear the buffer.
    ///
    /// The buffer is left untouched when `persist` fails so the caller can
    /// retry. Returns how many snapshots were flushed.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `persist`.
    pub fn flush<F, E>(&mut self, persist: F) -> Result<usize, E>
    where
        F: FnOnce(&[VideoSnapshot]) -> Result<(), E>,
    {
        if self.items.is_empty() {
            return Ok(0);
        }
        persist(&self.items)?;
        let flushed = self.items.len();
        self.items.clear();
        Ok(flushed)
    }
}
