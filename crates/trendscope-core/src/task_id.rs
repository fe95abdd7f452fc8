//! Deterministic idempotency keys for snapshot capture tasks.
//!
//! The task queue rejects a second task carrying the same name, which is what
//! makes repeated or overlapping scheduling runs safe.

use std::fmt::Display;

use crate::checkpoint::CheckpointHour;

const PREFIX: &str = "snap";

/// Task name for one `(video, checkpoint)` pair: `snap:{video_id}:{hour}`.
#[must_use]
pub fn snapshot_task_id(video_id: impl Display, checkpoint: CheckpointHour) -> String {
    format!("{PREFIX}:{video_id}:{checkpoint}")
}

/// Split a task name produced by [`snapshot_task_id`] back into its parts.
///
/// Returns `None` for anything else, including an empty video id or an hour
/// outside the checkpoint calendar.
#[must_use]
pub fn parse_snapshot_task_id(task_id: &str) -> Option<(String, CheckpointHour)> {
    let rest = task_id.strip_prefix(PREFIX)?.strip_prefix(':')?;
    let (video_id, hour) = rest.rsplit_once(':')?;
    if video_id.is_empty() {
        return None;
    }
    let checkpoint = CheckpointHour::from_hours(hour.parse().ok()?)?;
    Some((video_id.to_string(), checkpoint))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn formats_video_and_hour() {
        assert_eq!(
            snapshot_task_id("abc123", CheckpointHour::H24),
            "snap:abc123:24"
        );
    }

    #[test]
    fn uuid_video_ids_are_embedded_verbatim() {
        let id = Uuid::parse_str("0192b7a6-6e4f-7c2a-9d1e-4f5a6b7c8d9e").unwrap();
        assert_eq!(
            snapshot_task_id(id, CheckpointHour::H168),
            format!("snap:{id}:168")
        );
    }

    #[test]
    fn same_inputs_give_same_key() {
        let a = snapshot_task_id("v", CheckpointHour::H3);
        let b = snapshot_task_id("v", CheckpointHour::H3);
        assert_eq!(a, b);
        assert_ne!(a, snapshot_task_id("v", CheckpointHour::H6));
    }

    #[test]
    fn parse_inverts_format() {
        let key = snapshot_task_id("vid:with:colons", CheckpointHour::H48);
        assert_eq!(
            parse_snapshot_task_id(&key),
            Some(("vid:with:colons".to_string(), CheckpointHour::H48))
        );
    }

    #[test]
    fn parse_rejects_foreign_strings() {
        assert_eq!(parse_snapshot_task_id("snapshot-abc-24"), None);
        assert_eq!(parse_snapshot_task_id("snap::24"), None);
        assert_eq!(parse_snapshot_task_id("snap:abc:5"), None);
        assert_eq!(parse_snapshot_task_id("snap:abc:"), None);
        assert_eq!(parse_snapshot_task_id("task:abc:24"), None);
    }
}
