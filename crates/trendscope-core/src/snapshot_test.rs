use chrono::{Duration, TimeZone};

use super::*;
use crate::video::VideoMeta;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn video(published_at: DateTime<Utc>) -> Video {
    Video::new(
        Uuid::new_v4(),
        None,
        VideoMeta {
            youtube_video_id: "dQw4w9WgXcQ".to_string(),
            youtube_channel_id: "UCuAXFkgsw1L7xaCfnd5JJOw".to_string(),
            title: "Launch stream".to_string(),
            published_at,
            category_id: Some(28),
        },
        now(),
    )
    .unwrap()
}

fn draft(video_id: Uuid) -> SnapshotDraft {
    SnapshotDraft {
        id: Uuid::new_v4(),
        video_id,
        checkpoint_hour: 24,
        measured_at: now() - Duration::minutes(5),
        counts: SnapshotCounts {
            views: 1_200,
            likes: 87,
            subscriptions: 4,
        },
        source: "task".to_string(),
    }
}

#[test]
fn valid_draft_builds_snapshot() {
    let video_id = Uuid::new_v4();
    let snap = VideoSnapshot::new(draft(video_id), now()).unwrap();
    assert_eq!(snap.video_id(), video_id);
    assert_eq!(snap.checkpoint_hour(), CheckpointHour::H24);
    assert_eq!(snap.source(), SnapshotSource::Task);
    assert_eq!(snap.counts().views, 1_200);
    assert_eq!(snap.created_at(), now());
}

#[test]
fn rejects_checkpoint_outside_calendar() {
    let mut d = draft(Uuid::new_v4());
    d.checkpoint_hour = 5;
    assert_eq!(
        VideoSnapshot::new(d, now()).unwrap_err(),
        SnapshotError::InvalidCheckpoint(5)
    );
}

#[test]
fn rejects_future_measurement() {
    let mut d = draft(Uuid::new_v4());
    d.measured_at = now() + Duration::seconds(1);
    assert!(matches!(
        VideoSnapshot::new(d, now()),
        Err(SnapshotError::InvalidMeasuredAt { .. })
    ));
}

#[test]
fn measurement_exactly_now_is_accepted() {
    let mut d = draft(Uuid::new_v4());
    d.measured_at = now();
    assert!(VideoSnapshot::new(d, now()).is_ok());
}

#[test]
fn rejects_unknown_source() {
    let mut d = draft(Uuid::new_v4());
    d.source = "youtube_api".to_string();
    assert_eq!(
        VideoSnapshot::new(d, now()).unwrap_err(),
        SnapshotError::InvalidSource("youtube_api".to_string())
    );
}

#[test]
fn checkpoint_is_checked_before_source() {
    let mut d = draft(Uuid::new_v4());
    d.checkpoint_hour = 7;
    d.source = "bogus".to_string();
    assert_eq!(
        VideoSnapshot::new(d, now()).unwrap_err(),
        SnapshotError::InvalidCheckpoint(7)
    );
}

#[test]
fn measured_at_is_checked_before_source() {
    let mut d = draft(Uuid::new_v4());
    d.measured_at = now() + Duration::hours(1);
    d.source = "bogus".to_string();
    assert!(matches!(
        VideoSnapshot::new(d, now()),
        Err(SnapshotError::InvalidMeasuredAt { .. })
    ));
}

#[test]
fn rejects_measurement_before_publish() {
    let v = video(now() - Duration::hours(2));
    let mut d = draft(v.id);
    d.measured_at = now() - Duration::hours(3);
    assert!(matches!(
        VideoSnapshot::new_for_video(d, &v, now()),
        Err(SnapshotError::MeasuredBeforePublished { .. })
    ));
}

#[test]
fn measurement_at_publish_time_is_accepted() {
    let published = now() - Duration::hours(2);
    let v = video(published);
    let mut d = draft(v.id);
    d.measured_at = published;
    let snap = VideoSnapshot::new_for_video(d, &v, now()).unwrap();
    assert_eq!(snap.measured_at(), published);
}

#[test]
fn source_round_trips_through_display() {
    for source in [
        SnapshotSource::WebSub,
        SnapshotSource::Task,
        SnapshotSource::Manual,
    ] {
        assert_eq!(source.to_string().parse::<SnapshotSource>().unwrap(), source);
    }
}
