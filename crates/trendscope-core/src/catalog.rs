//! File-backed collaborators for the batch layer.
//!
//! `videos.yaml` and `keywords.yaml` are re-read on every run so edits take
//! effect without a restart. The task ledger is a JSON file rewritten on
//! every change; the snapshot log is append-only JSON lines.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkpoint::CheckpointHour;
use crate::error::{CatalogError, QueueError};
use crate::keyword::{FilterType, Keyword, NewKeyword, TargetField};
use crate::keyword_group::{KeywordGroup, NewKeywordGroup};
use crate::memory::{active_since, MemoryTaskQueue};
use crate::pattern::{flexible_name_pattern, KeywordPatternBuilder};
use crate::ports::{CandidateVideo, DispatchOutcome, KeywordSource, TaskQueue, VideoSource};
use crate::snapshot::VideoSnapshot;
use crate::task_id::parse_snapshot_task_id;
use crate::video::{Video, VideoMeta};

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VideoEntry {
    id: Uuid,
    #[serde(default)]
    channel_id: Option<Uuid>,
    #[serde(flatten)]
    meta: VideoMeta,
}

#[derive(Debug, Deserialize)]
struct VideosFile {
    #[serde(default)]
    videos: Vec<VideoEntry>,
    #[serde(default)]
    candidates: Vec<CandidateVideo>,
}

/// Tracked videos and trending candidates loaded from `videos.yaml`.
#[derive(Debug, Clone, Default)]
pub struct VideoCatalog {
    pub videos: Vec<Video>,
    pub candidates: Vec<CandidateVideo>,
}

impl VideoCatalog {
    /// Load and validate the video catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed, a video
    /// fails validation, or an id appears twice.
    pub fn load(path: &Path, now: DateTime<Utc>) -> Result<Self, CatalogError> {
        let file: VideosFile = read_yaml(path)?;
        Self::from_file(file, now)
    }

    fn from_file(file: VideosFile, now: DateTime<Utc>) -> Result<Self, CatalogError> {
        let mut seen_ids = HashSet::new();
        let mut seen_youtube_ids = HashSet::new();
        let mut videos = Vec::with_capacity(file.videos.len());

        for entry in file.videos {
            if !seen_ids.insert(entry.id) {
                return Err(CatalogError::Validation(format!(
                    "duplicate video id: {}",
                    entry.id
                )));
            }
            if !seen_youtube_ids.insert(entry.meta.youtube_video_id.clone()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate youtube video id: '{}'",
                    entry.meta.youtube_video_id
                )));
            }
            let video = Video::new(entry.id, entry.channel_id, entry.meta, now)
                .map_err(|e| CatalogError::Validation(format!("video {}: {e}", entry.id)))?;
            videos.push(video);
        }

        Ok(Self {
            videos,
            candidates: file.candidates,
        })
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }
}

impl VideoSource for VideoCatalog {
    fn list_active(&self, published_since: DateTime<Utc>) -> Result<Vec<Video>, CatalogError> {
        Ok(active_since(&self.videos, published_since))
    }

    fn list_candidates(&self) -> Result<Vec<CandidateVideo>, CatalogError> {
        Ok(self.candidates.clone())
    }
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

const fn default_enabled() -> bool {
    true
}

/// One rule in `keywords.yaml`.
///
/// The pattern comes from `pattern` verbatim if given, else from `keywords`
/// via the pattern builder, else from a lenient match on `name`.
#[derive(Debug, Deserialize)]
struct KeywordEntry {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    genre_id: Option<Uuid>,
    name: String,
    filter_type: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    target_field: Option<TargetField>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordsFile {
    #[serde(default)]
    keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    pub keywords: Vec<Keyword>,
    /// Entries that were defined as keyword lists.
    pub groups: Vec<KeywordGroup>,
}

impl KeywordCatalog {
    /// Load `keywords.yaml` and compile each entry into a [`Keyword`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed, an
    /// entry fails validation, or two entries share a name
    /// (case-insensitive).
    pub fn load(
        path: &Path,
        builder: &KeywordPatternBuilder,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let file: KeywordsFile = read_yaml(path)?;
        Self::from_file(file, builder, now)
    }

    fn from_file(
        file: KeywordsFile,
        builder: &KeywordPatternBuilder,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let mut seen_names = HashSet::new();
        let mut catalog = Self::default();

        for entry in file.keywords {
            if !seen_names.insert(entry.name.trim().to_lowercase()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate keyword name: '{}'",
                    entry.name
                )));
            }
            let name = entry.name.clone();
            catalog
                .add_entry(entry, builder, now)
                .map_err(|reason| CatalogError::Validation(format!("keyword '{name}': {reason}")))?;
        }

        Ok(catalog)
    }

    fn add_entry(
        &mut self,
        entry: KeywordEntry,
        builder: &KeywordPatternBuilder,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        let filter_type: FilterType = entry
            .filter_type
            .parse()
            .map_err(|e: crate::keyword::KeywordError| e.to_string())?;
        let id = entry.id.unwrap_or_else(Uuid::new_v4);

        let mut keyword = if let Some(pattern) = entry.pattern {
            regex::Regex::new(&pattern).map_err(|e| format!("pattern does not compile: {e}"))?;
            Keyword::new(
                NewKeyword {
                    id,
                    genre_id: entry.genre_id,
                    name: entry.name,
                    filter_type,
                    pattern,
                    target_field: entry.target_field,
                    description: entry.description,
                },
                now,
            )
            .map_err(|e| e.to_string())?
        } else if entry.keywords.is_empty() {
            let pattern = flexible_name_pattern(&entry.name)
                .map_err(|e| e.to_string())?
                .unwrap_or_default();
            Keyword::new(
                NewKeyword {
                    id,
                    genre_id: entry.genre_id,
                    name: entry.name,
                    filter_type,
                    pattern,
                    target_field: entry.target_field,
                    description: entry.description,
                },
                now,
            )
            .map_err(|e| e.to_string())?
        } else {
            let mut group = KeywordGroup::new(
                NewKeywordGroup {
                    id,
                    genre_id: entry.genre_id,
                    name: entry.name,
                    filter_type,
                    target_field: entry.target_field,
                    description: entry.description,
                    keywords: entry.keywords,
                },
                now,
            )
            .map_err(|e| e.to_string())?;
            group.enabled = entry.enabled;
            let keyword = group.to_keyword(builder, now).map_err(|e| e.to_string())?;
            self.groups.push(group);
            keyword
        };

        keyword.enabled = entry.enabled;
        self.keywords.push(keyword);
        Ok(())
    }
}

impl KeywordSource for KeywordCatalog {
    fn keywords(&self) -> Result<Vec<Keyword>, CatalogError> {
        Ok(self.keywords.clone())
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| CatalogError::Yaml {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Task ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct Ledger {
    tasks: Vec<LedgerEntry>,
    #[serde(default)]
    retired: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerEntry {
    id: String,
    eta: DateTime<Utc>,
}

/// [`TaskQueue`] persisted to a JSON ledger file.
///
/// Deduplication is by task name, same as [`MemoryTaskQueue`], including
/// cancelled names. Every change takes an exclusive lock on `<ledger>.lock`,
/// re-reads the ledger, applies the change, and writes it back, so several
/// processes can share one ledger. A change that cannot be written is
/// discarded.
#[derive(Debug)]
pub struct TaskLedgerQueue {
    path: PathBuf,
    inner: MemoryTaskQueue,
}

impl TaskLedgerQueue {
    /// Open the ledger, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the file cannot be read, is not valid JSON,
    /// or holds a task name that is not a snapshot task id.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let path = path.into();
        let inner = read_ledger(&path)?;
        Ok(Self { path, inner })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queued tasks as of the last read or change.
    #[must_use]
    pub fn tasks(&self) -> &BTreeMap<String, DateTime<Utc>> {
        self.inner.tasks()
    }

    /// Cancelled or completed task names as of the last read or change.
    #[must_use]
    pub fn retired(&self) -> &BTreeMap<String, DateTime<Utc>> {
        self.inner.retired()
    }

    /// An in-memory copy for dry runs; changes to it are never written.
    #[must_use]
    pub fn detached(&self) -> MemoryTaskQueue {
        self.inner.clone()
    }

    /// Apply `change` to the current on-disk ledger under the file lock.
    /// `change` returns its result and whether anything changed.
    fn transact<T, F>(&mut self, change: F) -> Result<T, QueueError>
    where
        F: FnOnce(&mut MemoryTaskQueue) -> Result<(T, bool), QueueError>,
    {
        let path = self.path.display().to_string();
        let io_err = |e: std::io::Error| QueueError::Io {
            path: path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(sidecar(&self.path, ".lock"))
            .map_err(io_err)?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(io_err)?;

        self.inner = read_ledger(&self.path)?;
        let mut next = self.inner.clone();
        let (out, changed) = change(&mut next)?;
        if changed {
            write_ledger(&self.path, &next)?;
            self.inner = next;
        }
        Ok(out)
    }
}

impl TaskQueue for TaskLedgerQueue {
    fn schedule(
        &mut self,
        task_id: &str,
        eta: DateTime<Utc>,
    ) -> Result<DispatchOutcome, QueueError> {
        self.transact(|queue| {
            let outcome = queue.schedule(task_id, eta)?;
            Ok((outcome, outcome == DispatchOutcome::Created))
        })
    }

    fn cancel(&mut self, task_id: &str) -> Result<bool, QueueError> {
        self.transact(|queue| {
            let cancelled = queue.cancel(task_id)?;
            Ok((cancelled, cancelled))
        })
    }

    fn prune(&mut self, before: DateTime<Utc>) -> Result<usize, QueueError> {
        self.transact(|queue| {
            let pruned = queue.prune(before)?;
            Ok((pruned, pruned > 0))
        })
    }
}

/// `path` with `suffix` appended to the file name.
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn read_ledger(path: &Path) -> Result<MemoryTaskQueue, QueueError> {
    let ledger = match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<Ledger>(&content).map_err(|e| QueueError::Decode {
            path: path.display().to_string(),
            source: e,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ledger::default(),
        Err(e) => {
            return Err(QueueError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let collect = |entries: Vec<LedgerEntry>| -> Result<BTreeMap<String, DateTime<Utc>>, QueueError> {
        let mut out = BTreeMap::new();
        for entry in entries {
            if parse_snapshot_task_id(&entry.id).is_none() {
                return Err(QueueError::MalformedTaskId(entry.id));
            }
            out.insert(entry.id, entry.eta);
        }
        Ok(out)
    };

    let tasks = collect(ledger.tasks)?;
    let retired = collect(ledger.retired)?;
    Ok(MemoryTaskQueue::with_tasks(tasks).with_retired(retired))
}

/// Write the ledger to a temp file and rename it over the old one, so
/// readers never see a partial ledger.
fn write_ledger(path: &Path, queue: &MemoryTaskQueue) -> Result<(), QueueError> {
    let io_err = |e: std::io::Error| QueueError::Io {
        path: path.display().to_string(),
        source: e,
    };
    let entries = |map: &BTreeMap<String, DateTime<Utc>>| -> Vec<LedgerEntry> {
        map.iter()
            .map(|(id, eta)| LedgerEntry {
                id: id.clone(),
                eta: *eta,
            })
            .collect()
    };

    let ledger = Ledger {
        tasks: entries(queue.tasks()),
        retired: entries(queue.retired()),
    };
    let body = serde_json::to_string_pretty(&ledger).map_err(|e| QueueError::Decode {
        path: path.display().to_string(),
        source: e,
    })?;

    let tmp = sidecar(path, ".tmp");
    std::fs::write(&tmp, body).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

// ---------------------------------------------------------------------------
// Snapshot log
// ---------------------------------------------------------------------------

/// Append-only history of captured snapshots, one JSON object per line.
#[derive(Debug, Clone)]
pub struct SnapshotLog {
    path: PathBuf,
}

impl SnapshotLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Every recorded snapshot in append order; empty if the log does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or a line is not a
    /// valid snapshot record.
    pub fn read_all(&self) -> Result<Vec<VideoSnapshot>, CatalogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CatalogError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CatalogError::from))
            .collect()
    }

    /// # Errors
    ///
    /// See [`SnapshotLog::read_all`].
    pub fn for_video(&self, video_id: Uuid) -> Result<Vec<VideoSnapshot>, CatalogError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|s| s.video_id() == video_id)
            .collect())
    }

    /// Whether a snapshot for this checkpoint was already captured.
    ///
    /// # Errors
    ///
    /// See [`SnapshotLog::read_all`].
    pub fn contains(&self, video_id: Uuid, checkpoint: CheckpointHour) -> Result<bool, CatalogError> {
        Ok(self
            .for_video(video_id)?
            .iter()
            .any(|s| s.checkpoint_hour() == checkpoint))
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] if the log cannot be opened or written.
    pub fn append(&self, snapshots: &[VideoSnapshot]) -> Result<(), CatalogError> {
        let io_err = |e| CatalogError::Io {
            path: self.path.display().to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut body = String::new();
        for snapshot in snapshots {
            body.push_str(&serde_json::to_string(snapshot)?);
            body.push('\n');
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(body.as_bytes()).map_err(io_err)
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
