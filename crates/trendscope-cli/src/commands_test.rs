use std::path::Path;

use chrono::TimeZone;
use trendscope_core::{Environment, FilterResult};

use super::*;

const VIDEO_ID: &str = "6a1f0c3e-0000-4000-8000-000000000001";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn config_in(dir: &Path) -> AppConfig {
    std::fs::write(
        dir.join("videos.yaml"),
        format!(
            r"
videos:
  - id: {VIDEO_ID}
    youtube_video_id: abc123
    youtube_channel_id: UC_chan
    title: Rust in 100 seconds
    published_at: 2026-10-18T10:00:00Z
candidates:
  - youtube_video_id: c1
    title: Learn Rust today
    published_at: 2026-10-18T00:00:00Z
  - youtube_video_id: c2
    title: Big casino night
    published_at: 2026-10-18T00:00:00Z
  - youtube_video_id: c3
    title: Cooking pasta
    published_at: 2026-10-18T00:00:00Z
"
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("keywords.yaml"),
        r"
keywords:
  - name: Rust
    filter_type: include
  - name: Gambling
    filter_type: exclude
    keywords: [casino, slots]
",
    )
    .unwrap();

    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        videos_path: dir.join("videos.yaml"),
        keywords_path: dir.join("keywords.yaml"),
        task_ledger_path: dir.join("data").join("tasks.json"),
        snapshot_log_path: dir.join("data").join("snapshots.jsonl"),
        active_window_hours: 24,
        schedule_cron: "0 */15 * * * *".to_string(),
        trending_cron: "0 0 * * * *".to_string(),
    }
}

fn video_id() -> Uuid {
    VIDEO_ID.parse().unwrap()
}

fn counts() -> SnapshotCounts {
    SnapshotCounts {
        views: 500,
        likes: 20,
        subscriptions: 2,
    }
}

#[test]
fn schedule_once_writes_ledger_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    // Published two hours ago: every checkpoint from 3h on is still ahead.
    let first = schedule_once(&config, config.active_window(), false, now()).unwrap();
    let second = schedule_once(&config, config.active_window(), false, now()).unwrap();

    assert_eq!(first.tasks_created, 7);
    assert_eq!(second.tasks_created, 0);
    assert_eq!(second.duplicates, 7);
    assert_eq!(
        TaskLedgerQueue::open(&config.task_ledger_path)
            .unwrap()
            .tasks()
            .len(),
        7
    );
}

#[test]
fn schedule_once_dry_run_leaves_ledger_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let summary = schedule_once(&config, config.active_window(), true, now()).unwrap();

    assert_eq!(summary.tasks_created, 7);
    assert!(!config.task_ledger_path.exists());
}

#[test]
fn schedule_once_window_excludes_older_videos() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let summary = schedule_once(&config, TimeDelta::hours(1), false, now()).unwrap();
    assert_eq!(summary.videos_processed, 0);
}

#[test]
fn trending_once_applies_exclude_and_include() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let summary = trending_once(&config, now()).unwrap();
    let results: Vec<FilterResult> = summary.classified.iter().map(|c| c.result).collect();

    assert_eq!(
        results,
        vec![FilterResult::Include, FilterResult::Exclude, FilterResult::Neutral]
    );
    assert_eq!(summary.admitted().count(), 2);
}

#[test]
fn capture_once_appends_snapshot_and_drops_task() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    schedule_once(&config, config.active_window(), false, now()).unwrap();

    let later = now() + TimeDelta::hours(1);
    capture_once(&config, video_id(), CheckpointHour::H3, counts(), "task", later).unwrap();

    let history = SnapshotLog::new(&config.snapshot_log_path)
        .for_video(video_id())
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].counts(), counts());
    assert_eq!(history[0].measured_at(), later);

    let queue = TaskLedgerQueue::open(&config.task_ledger_path).unwrap();
    assert_eq!(queue.tasks().len(), 6);
    assert!(!queue
        .tasks()
        .contains_key(&snapshot_task_id(video_id(), CheckpointHour::H3)));
}

#[test]
fn schedule_after_capture_does_not_requeue_captured_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    schedule_once(&config, config.active_window(), false, now()).unwrap();

    let later = now() + TimeDelta::hours(1);
    capture_once(&config, video_id(), CheckpointHour::H3, counts(), "task", later).unwrap();
    let summary = schedule_once(&config, config.active_window(), false, later).unwrap();

    assert_eq!(summary.tasks_created, 0);
    let queue = TaskLedgerQueue::open(&config.task_ledger_path).unwrap();
    let h3 = snapshot_task_id(video_id(), CheckpointHour::H3);
    assert!(!queue.tasks().contains_key(&h3));
    assert!(queue.retired().contains_key(&h3));
}

#[test]
fn capture_before_any_schedule_pass_still_blocks_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    capture_once(&config, video_id(), CheckpointHour::H3, counts(), "manual", now()).unwrap();
    let summary = schedule_once(&config, config.active_window(), false, now()).unwrap();

    let queue = TaskLedgerQueue::open(&config.task_ledger_path).unwrap();
    let h3 = snapshot_task_id(video_id(), CheckpointHour::H3);
    assert!(!queue.tasks().contains_key(&h3));
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.tasks_created, queue.tasks().len());
}

#[test]
fn capture_once_rejects_second_capture_of_same_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    capture_once(&config, video_id(), CheckpointHour::H3, counts(), "manual", now()).unwrap();
    let err = capture_once(&config, video_id(), CheckpointHour::H3, counts(), "manual", now())
        .unwrap_err();

    assert!(err.to_string().contains("already has a snapshot"));
}

#[test]
fn capture_once_rejects_unknown_video() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = capture_once(&config, Uuid::nil(), CheckpointHour::H3, counts(), "manual", now())
        .unwrap_err();
    assert!(err.to_string().contains("not in the catalog"));
}

#[test]
fn capture_once_rejects_unknown_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = capture_once(&config, video_id(), CheckpointHour::H3, counts(), "cron", now())
        .unwrap_err();
    assert!(err.to_string().contains("invalid snapshot source"));
    assert!(SnapshotLog::new(&config.snapshot_log_path)
        .read_all()
        .unwrap()
        .is_empty());
}
