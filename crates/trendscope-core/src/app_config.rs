use std::path::PathBuf;

use chrono::TimeDelta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub videos_path: PathBuf,
    pub keywords_path: PathBuf,
    pub task_ledger_path: PathBuf,
    pub snapshot_log_path: PathBuf,
    /// Videos published more than this many hours ago are not scheduled.
    pub active_window_hours: u32,
    pub schedule_cron: String,
    pub trending_cron: String,
}

impl AppConfig {
    #[must_use]
    pub fn active_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.active_window_hours))
    }
}
