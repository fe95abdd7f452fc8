//! Snapshot scheduling and trending-filter engine.
//!
//! The domain modules (`checkpoint`, `scheduler`, `task_id`, `snapshot`,
//! `video`, `keyword`, `keyword_group`, `pattern`, `filter`) are pure and
//! perform no I/O. Collaborator seams live in [`ports`]; `memory` and
//! `catalog` provide the in-process and file-backed implementations used by
//! the CLI batch layer, and [`dispatch`] wires them together.

pub mod app_config;
pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod keyword;
pub mod keyword_group;
pub mod memory;
pub mod pattern;
pub mod ports;
pub mod scheduler;
pub mod snapshot;
pub mod task_id;
pub mod video;

pub use app_config::{AppConfig, Environment};
pub use catalog::{KeywordCatalog, SnapshotLog, TaskLedgerQueue, VideoCatalog};
pub use checkpoint::{all_checkpoints, checkpoints_after, is_valid, CheckpointHour};
pub use config::{load_app_config, load_app_config_from_env};
pub use dispatch::{
    cancel_video_tasks, capture_snapshot, run_schedule_pass, run_trending_pass, CaptureError,
    ClassifiedCandidate, SchedulePassSummary, TrendingPassSummary,
};
pub use error::{CatalogError, ConfigError, QueueError};
pub use filter::{CompiledKeywordSet, FilterResult, TrendingFilter};
pub use keyword::{FilterType, Keyword, KeywordError, KeywordUpdate, NewKeyword, TargetField};
pub use keyword_group::{
    patterns_by_filter_type, KeywordGroup, KeywordGroupError, KeywordItem, NewKeywordGroup,
};
pub use memory::{MemoryTaskQueue, StaticKeywordSource, StaticStatsSource, StaticVideoSource};
pub use pattern::{flexible_name_pattern, AbbreviationTable, KeywordPatternBuilder};
pub use ports::{
    CandidateVideo, DispatchOutcome, KeywordSource, StatsError, StatsSource, TaskQueue,
    VideoSource,
};
pub use scheduler::{schedule_snapshots, ScheduledSnapshot};
pub use snapshot::{SnapshotCounts, SnapshotDraft, SnapshotError, SnapshotSource, VideoSnapshot};
pub use task_id::{parse_snapshot_task_id, snapshot_task_id};
pub use video::{PendingSnapshots, Video, VideoError, VideoMeta};
