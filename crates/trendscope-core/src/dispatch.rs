//! Batch passes that wire the pure engine to its collaborators.
//!
//! Failures on a single task are logged and counted rather than propagated so
//! one bad enqueue does not abort the whole pass. Failures reading the
//! sources themselves end the pass with an error.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::checkpoint::{checkpoints_after, CheckpointHour};
use crate::error::{CatalogError, QueueError};
use crate::filter::{CompiledKeywordSet, FilterResult};
use crate::ports::{
    CandidateVideo, DispatchOutcome, KeywordSource, StatsError, StatsSource, TaskQueue,
    VideoSource,
};
use crate::scheduler::schedule_snapshots;
use crate::snapshot::{SnapshotDraft, SnapshotError, VideoSnapshot};
use crate::task_id::snapshot_task_id;
use crate::video::Video;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulePassSummary {
    pub videos_processed: usize,
    pub tasks_created: usize,
    /// Tasks the queue already held under the same name.
    pub duplicates: usize,
    pub failures: usize,
    /// Expired tasks dropped from the queue.
    pub pruned: usize,
}

/// Schedule every remaining checkpoint for videos published within `window`
/// of `now`, then prune tasks whose eta is more than a week before `now`.
///
/// Safe to repeat: the queue drops tasks whose name it already holds, so a
/// second pass over the same videos only counts duplicates. Pruned names are
/// never emitted again because lapsed checkpoints are not rescheduled.
///
/// # Errors
///
/// Returns [`CatalogError`] if the active videos cannot be listed. Per-task
/// queue failures are logged and counted in
/// [`SchedulePassSummary::failures`].
pub fn run_schedule_pass<V, Q>(
    videos: &V,
    queue: &mut Q,
    window: TimeDelta,
    now: DateTime<Utc>,
) -> Result<SchedulePassSummary, CatalogError>
where
    V: VideoSource + ?Sized,
    Q: TaskQueue + ?Sized,
{
    let active = videos.list_active(now - window)?;
    let mut summary = SchedulePassSummary::default();

    for video in &active {
        summary.videos_processed += 1;
        for scheduled in schedule_snapshots(video, now) {
            let task_id = scheduled.task_id();
            match queue.schedule(&task_id, scheduled.eta) {
                Ok(DispatchOutcome::Created) => {
                    tracing::debug!(task_id = %task_id, eta = %scheduled.eta, "snapshot task queued");
                    summary.tasks_created += 1;
                }
                Ok(DispatchOutcome::AlreadyExists) => summary.duplicates += 1,
                Err(e) => {
                    tracing::error!(task_id = %task_id, error = %e, "failed to queue snapshot task");
                    summary.failures += 1;
                }
            }
        }
    }

    let cutoff = now - TimeDelta::hours(i64::from(CheckpointHour::H168.hours()));
    match queue.prune(cutoff) {
        Ok(pruned) => summary.pruned = pruned,
        Err(e) => tracing::warn!(error = %e, "failed to prune expired snapshot tasks"),
    }

    tracing::info!(
        videos = summary.videos_processed,
        created = summary.tasks_created,
        duplicates = summary.duplicates,
        failures = summary.failures,
        pruned = summary.pruned,
        "schedule pass complete"
    );
    Ok(summary)
}

/// Cancel queued capture tasks for a video: one checkpoint, or all of them
/// when `checkpoint` is `None`. Returns how many tasks were removed.
///
/// # Errors
///
/// Returns the first [`QueueError`] the queue reports.
pub fn cancel_video_tasks<Q>(
    queue: &mut Q,
    video_id: Uuid,
    checkpoint: Option<CheckpointHour>,
) -> Result<usize, QueueError>
where
    Q: TaskQueue + ?Sized,
{
    let targets = match checkpoint {
        Some(hour) => vec![hour],
        None => checkpoints_after(CheckpointHour::H0),
    };

    let mut cancelled = 0;
    for hour in targets {
        if queue.cancel(&snapshot_task_id(video_id, hour))? {
            cancelled += 1;
        }
    }
    tracing::info!(video_id = %video_id, cancelled, "snapshot tasks cancelled");
    Ok(cancelled)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedCandidate {
    pub candidate: CandidateVideo,
    pub result: FilterResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendingPassSummary {
    pub included: usize,
    pub neutral: usize,
    pub excluded: usize,
    /// Every candidate in source order with its classification.
    pub classified: Vec<ClassifiedCandidate>,
}

impl TrendingPassSummary {
    /// Candidates that enter the trending pipeline.
    pub fn admitted(&self) -> impl Iterator<Item = &CandidateVideo> {
        self.classified
            .iter()
            .filter(|c| c.result.admits())
            .map(|c| &c.candidate)
    }
}

/// Classify every trending candidate against the current keyword set.
///
/// # Errors
///
/// Returns [`CatalogError`] if candidates or keywords cannot be read.
pub fn run_trending_pass<V, K>(videos: &V, keywords: &K) -> Result<TrendingPassSummary, CatalogError>
where
    V: VideoSource + ?Sized,
    K: KeywordSource + ?Sized,
{
    let compiled = CompiledKeywordSet::compile(&keywords.keywords()?);
    let mut summary = TrendingPassSummary::default();

    for candidate in videos.list_candidates()? {
        let result = compiled.classify(&candidate.title);
        match result {
            FilterResult::Include => summary.included += 1,
            FilterResult::Neutral => summary.neutral += 1,
            FilterResult::Exclude => summary.excluded += 1,
        }
        tracing::debug!(
            youtube_video_id = %candidate.youtube_video_id,
            %result,
            "candidate classified"
        );
        summary.classified.push(ClassifiedCandidate { candidate, result });
    }

    tracing::info!(
        patterns = compiled.len(),
        included = summary.included,
        neutral = summary.neutral,
        excluded = summary.excluded,
        "trending pass complete"
    );
    Ok(summary)
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Fetch current counts for `video` and record them as a snapshot measured at
/// `now`.
///
/// The checkpoint is checked before any statistics are fetched.
///
/// # Errors
///
/// Returns [`CaptureError::Snapshot`] for an invalid checkpoint, source, or
/// measurement time and [`CaptureError::Stats`] if counts are unavailable.
pub fn capture_snapshot<S>(
    video: &Video,
    checkpoint_hour: i64,
    source: &str,
    stats: &S,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<VideoSnapshot, CaptureError>
where
    S: StatsSource + ?Sized,
{
    if CheckpointHour::from_hours(checkpoint_hour).is_none() {
        return Err(SnapshotError::InvalidCheckpoint(checkpoint_hour).into());
    }

    let counts = stats.video_statistics(&video.youtube_video_id)?;
    let snapshot = VideoSnapshot::new_for_video(
        SnapshotDraft {
            id,
            video_id: video.id,
            checkpoint_hour,
            measured_at: now,
            counts,
            source: source.to_string(),
        },
        video,
        now,
    )?;
    Ok(snapshot)
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
