use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failures reading or validating the YAML catalogs and the snapshot log.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to encode or decode snapshot log record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("task ledger I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task ledger {path} is not valid JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("task ledger contains malformed task id: {0}")]
    MalformedTaskId(String),
}
