//! Command handlers for the CLI.
//!
//! Catalogs are reloaded on every invocation. The `*_once` functions are
//! shared with the `watch` jobs, which log their summaries instead of
//! printing them.

use chrono::{DateTime, TimeDelta, Utc};
use trendscope_core::{
    cancel_video_tasks, capture_snapshot, flexible_name_pattern, parse_snapshot_task_id,
    patterns_by_filter_type, run_schedule_pass, run_trending_pass, snapshot_task_id, AppConfig,
    CheckpointHour, KeywordCatalog, KeywordPatternBuilder, PendingSnapshots, SchedulePassSummary,
    SnapshotCounts, SnapshotLog, StaticStatsSource, TaskLedgerQueue, TaskQueue, TrendingFilter,
    TrendingPassSummary, VideoCatalog,
};
use uuid::Uuid;

/// Run one schedule pass against the task ledger.
///
/// With `dry_run` the pass runs against a detached copy of the ledger, so
/// the counts are accurate but nothing is written.
///
/// # Errors
///
/// Returns an error if the video catalog or task ledger cannot be loaded.
pub(crate) fn schedule_once(
    config: &AppConfig,
    window: TimeDelta,
    dry_run: bool,
    now: DateTime<Utc>,
) -> anyhow::Result<SchedulePassSummary> {
    let videos = VideoCatalog::load(&config.videos_path, now)?;
    let mut queue = TaskLedgerQueue::open(&config.task_ledger_path)?;

    let summary = if dry_run {
        let mut detached = queue.detached();
        run_schedule_pass(&videos, &mut detached, window, now)?
    } else {
        run_schedule_pass(&videos, &mut queue, window, now)?
    };
    Ok(summary)
}

/// Classify every trending candidate against the keyword catalog.
///
/// # Errors
///
/// Returns an error if either catalog cannot be loaded.
pub(crate) fn trending_once(
    config: &AppConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<TrendingPassSummary> {
    let videos = VideoCatalog::load(&config.videos_path, now)?;
    let keywords = KeywordCatalog::load(
        &config.keywords_path,
        &KeywordPatternBuilder::default(),
        now,
    )?;
    Ok(run_trending_pass(&videos, &keywords)?)
}

pub(crate) fn run_schedule(
    config: &AppConfig,
    window_hours: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let window = window_hours.map_or_else(
        || config.active_window(),
        |hours| TimeDelta::hours(i64::from(hours)),
    );
    let summary = schedule_once(config, window, dry_run, Utc::now())?;

    let prefix = if dry_run { "dry-run: would queue" } else { "queued" };
    println!(
        "{prefix} {} tasks for {} videos ({} already queued, {} failed, {} expired pruned)",
        summary.tasks_created,
        summary.videos_processed,
        summary.duplicates,
        summary.failures,
        summary.pruned
    );

    let attempted = summary.tasks_created + summary.duplicates + summary.failures;
    if attempted > 0 && summary.failures == attempted {
        anyhow::bail!("all {} snapshot tasks failed to queue", summary.failures);
    }
    Ok(())
}

pub(crate) fn run_cancel(
    config: &AppConfig,
    video_id: Uuid,
    hour: Option<CheckpointHour>,
) -> anyhow::Result<()> {
    let mut queue = TaskLedgerQueue::open(&config.task_ledger_path)?;
    let cancelled = cancel_video_tasks(&mut queue, video_id, hour)?;
    println!("cancelled {cancelled} tasks for video {video_id}");
    Ok(())
}

pub(crate) fn run_tasks(config: &AppConfig, video: Option<Uuid>) -> anyhow::Result<()> {
    let queue = TaskLedgerQueue::open(&config.task_ledger_path)?;
    let wanted = video.map(|id| id.to_string());

    let mut shown = 0usize;
    for (task_id, eta) in queue.tasks() {
        let Some((video_id, hour)) = parse_snapshot_task_id(task_id) else {
            continue;
        };
        if wanted.as_ref().is_some_and(|w| *w != video_id) {
            continue;
        }
        println!("{video_id}\t{:>3}h\t{}", hour.hours(), eta.to_rfc3339());
        shown += 1;
    }
    println!("{shown} queued tasks");
    Ok(())
}

/// Record counts for one checkpoint of a tracked video and retire its task
/// name.
///
/// # Errors
///
/// Returns an error if the video is unknown, the checkpoint was already
/// captured, or the snapshot fails validation.
pub(crate) fn capture_once(
    config: &AppConfig,
    video_id: Uuid,
    hour: CheckpointHour,
    counts: SnapshotCounts,
    source: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let videos = VideoCatalog::load(&config.videos_path, now)?;
    let video = videos
        .find(video_id)
        .ok_or_else(|| anyhow::anyhow!("video {video_id} is not in the catalog"))?;

    let log = SnapshotLog::new(&config.snapshot_log_path);
    if log.contains(video_id, hour)? {
        anyhow::bail!("video {video_id} already has a snapshot for checkpoint {hour}");
    }

    let stats = StaticStatsSource {
        counts: [(video.youtube_video_id.clone(), counts)].into_iter().collect(),
    };
    let snapshot = capture_snapshot(
        video,
        i64::from(hour.hours()),
        source,
        &stats,
        Uuid::new_v4(),
        now,
    )?;

    let mut pending = PendingSnapshots::new();
    video.attach_snapshot(snapshot, &mut pending)?;
    pending.flush(|batch| log.append(batch))?;

    // Retire the checkpoint's task name even when no pass had queued it yet,
    // so later schedule passes skip the captured checkpoint.
    let task_id = snapshot_task_id(video_id, hour);
    let eta = video.published_at + TimeDelta::hours(i64::from(hour.hours()));
    let mut queue = TaskLedgerQueue::open(&config.task_ledger_path)?;
    queue.schedule(&task_id, eta)?;
    queue.cancel(&task_id)?;
    Ok(())
}

pub(crate) fn run_capture(
    config: &AppConfig,
    video_id: Uuid,
    hour: CheckpointHour,
    counts: SnapshotCounts,
    source: &str,
) -> anyhow::Result<()> {
    capture_once(config, video_id, hour, counts, source, Utc::now())?;
    println!("captured checkpoint {hour} for video {video_id}");
    Ok(())
}

pub(crate) fn run_history(config: &AppConfig, video_id: Uuid) -> anyhow::Result<()> {
    let snapshots = SnapshotLog::new(&config.snapshot_log_path).for_video(video_id)?;
    if snapshots.is_empty() {
        println!("no snapshots recorded for video {video_id}");
        return Ok(());
    }
    for s in &snapshots {
        let counts = s.counts();
        println!(
            "{:>3}h\t{}\tviews={}\tlikes={}\tsubs={}\t{}",
            s.checkpoint_hour().hours(),
            s.measured_at().to_rfc3339(),
            counts.views,
            counts.likes,
            counts.subscriptions,
            s.source()
        );
    }
    Ok(())
}

pub(crate) fn run_pattern(
    config: &AppConfig,
    keywords: &[String],
    name: Option<&str>,
) -> anyhow::Result<()> {
    let builder = KeywordPatternBuilder::default();

    if let Some(name) = name {
        match flexible_name_pattern(name)? {
            Some(pattern) => println!("{pattern}"),
            None => anyhow::bail!("name is blank"),
        }
        return Ok(());
    }

    if !keywords.is_empty() {
        let pattern = builder.generate_pattern(keywords);
        if pattern.is_empty() {
            anyhow::bail!("every keyword is blank");
        }
        println!("{pattern}");
        return Ok(());
    }

    let catalog = KeywordCatalog::load(&config.keywords_path, &builder, Utc::now())?;
    for (filter_type, patterns) in patterns_by_filter_type(&catalog.groups, &builder) {
        println!("{filter_type}:");
        for pattern in patterns {
            println!("  {pattern}");
        }
    }
    Ok(())
}

pub(crate) fn run_filter(config: &AppConfig, title: &str) -> anyhow::Result<()> {
    let catalog = KeywordCatalog::load(
        &config.keywords_path,
        &KeywordPatternBuilder::default(),
        Utc::now(),
    )?;
    let result = TrendingFilter.filter(title, &catalog.keywords);
    println!("{result}");
    Ok(())
}

pub(crate) fn run_trending(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let summary = trending_once(config, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for candidate in summary.admitted() {
        println!("{}\t{}", candidate.youtube_video_id, candidate.title);
    }
    println!(
        "{} admitted ({} include, {} neutral), {} excluded",
        summary.included + summary.neutral,
        summary.included,
        summary.neutral,
        summary.excluded
    );
    Ok(())
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
