//! In-process collaborator implementations.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{CatalogError, QueueError};
use crate::keyword::Keyword;
use crate::ports::{
    CandidateVideo, DispatchOutcome, KeywordSource, StatsError, StatsSource, TaskQueue,
    VideoSource,
};
use crate::snapshot::SnapshotCounts;
use crate::video::Video;

/// Task queue held in memory, keyed and ordered by task name.
///
/// Cancelled names are retired rather than forgotten, so a later schedule
/// under the same name is reported as [`DispatchOutcome::AlreadyExists`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTaskQueue {
    tasks: BTreeMap<String, DateTime<Utc>>,
    retired: BTreeMap<String, DateTime<Utc>>,
}

impl MemoryTaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with tasks already known to be queued elsewhere.
    #[must_use]
    pub fn with_tasks(tasks: BTreeMap<String, DateTime<Utc>>) -> Self {
        Self {
            tasks,
            retired: BTreeMap::new(),
        }
    }

    /// Seed with names that were already cancelled or completed.
    #[must_use]
    pub fn with_retired(mut self, retired: BTreeMap<String, DateTime<Utc>>) -> Self {
        self.retired = retired;
        self
    }

    /// Tasks still waiting to fire.
    #[must_use]
    pub fn tasks(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.tasks
    }

    /// Cancelled or completed task names with their original eta.
    #[must_use]
    pub fn retired(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.retired
    }

    #[must_use]
    pub fn eta(&self, task_id: &str) -> Option<DateTime<Utc>> {
        self.tasks.get(task_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskQueue for MemoryTaskQueue {
    fn schedule(
        &mut self,
        task_id: &str,
        eta: DateTime<Utc>,
    ) -> Result<DispatchOutcome, QueueError> {
        if self.tasks.contains_key(task_id) || self.retired.contains_key(task_id) {
            return Ok(DispatchOutcome::AlreadyExists);
        }
        self.tasks.insert(task_id.to_string(), eta);
        Ok(DispatchOutcome::Created)
    }

    fn cancel(&mut self, task_id: &str) -> Result<bool, QueueError> {
        match self.tasks.remove(task_id) {
            Some(eta) => {
                self.retired.insert(task_id.to_string(), eta);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn prune(&mut self, before: DateTime<Utc>) -> Result<usize, QueueError> {
        let count = self.tasks.len() + self.retired.len();
        self.tasks.retain(|_, eta| *eta >= before);
        self.retired.retain(|_, eta| *eta >= before);
        Ok(count - self.tasks.len() - self.retired.len())
    }
}

/// Fixed set of tracked videos and trending candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticVideoSource {
    pub videos: Vec<Video>,
    pub candidates: Vec<CandidateVideo>,
}

impl VideoSource for StaticVideoSource {
    fn list_active(&self, published_since: DateTime<Utc>) -> Result<Vec<Video>, CatalogError> {
        Ok(active_since(&self.videos, published_since))
    }

    fn list_candidates(&self) -> Result<Vec<CandidateVideo>, CatalogError> {
        Ok(self.candidates.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticKeywordSource {
    pub keywords: Vec<Keyword>,
}

impl KeywordSource for StaticKeywordSource {
    fn keywords(&self) -> Result<Vec<Keyword>, CatalogError> {
        Ok(self.keywords.clone())
    }
}

/// Counts looked up by YouTube video id.
#[derive(Debug, Clone, Default)]
pub struct StaticStatsSource {
    pub counts: HashMap<String, SnapshotCounts>,
}

impl StatsSource for StaticStatsSource {
    fn video_statistics(&self, youtube_video_id: &str) -> Result<SnapshotCounts, StatsError> {
        self.counts
            .get(youtube_video_id)
            .copied()
            .ok_or_else(|| StatsError::Unavailable {
                video: youtube_video_id.to_string(),
                reason: "no counts recorded".to_string(),
            })
    }
}

pub(crate) fn active_since(videos: &[Video], published_since: DateTime<Utc>) -> Vec<Video> {
    videos
        .iter()
        .filter(|v| !v.is_deleted() && v.published_at >= published_since)
        .cloned()
        .collect()
}
