//! Works out which capture checkpoints are still ahead of a video.
//!
//! Output depends only on `(video.published_at, now)`, so repeated runs
//! recompute the same future checkpoints; deduplication happens at the task
//! queue through [`snapshot_task_id`](crate::task_id::snapshot_task_id).

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::checkpoint::{checkpoints_after, CheckpointHour};
use crate::task_id::snapshot_task_id;
use crate::video::Video;

/// A checkpoint that still needs a capture task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledSnapshot {
    pub video_id: Uuid,
    pub checkpoint_hour: CheckpointHour,
    pub eta: DateTime<Utc>,
}

impl ScheduledSnapshot {
    /// Idempotency key for the task queue.
    #[must_use]
    pub fn task_id(&self) -> String {
        snapshot_task_id(self.video_id, self.checkpoint_hour)
    }
}

/// Every checkpoint after the publish checkpoint whose due time has not
/// passed yet, ascending by hour.
///
/// Lapsed checkpoints are skipped without backfill. A checkpoint due exactly
/// at `now` is still scheduled.
#[must_use]
pub fn schedule_snapshots(video: &Video, now: DateTime<Utc>) -> Vec<ScheduledSnapshot> {
    checkpoints_after(CheckpointHour::H0)
        .into_iter()
        .filter_map(|checkpoint_hour| {
            let offset = TimeDelta::hours(i64::from(checkpoint_hour.hours()));
            let eta = video.published_at.checked_add_signed(offset)?;
            if eta < now {
                return None;
            }
            Some(ScheduledSnapshot {
                video_id: video.id,
                checkpoint_hour,
                eta,
            })
        })
        .collect()
}
