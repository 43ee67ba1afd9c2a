use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogexportError {
    #[error("badly formatted time: '{0}'")]
    MalformedTime(String),

    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange { start: i64, end: i64 },

    #[error("end anchor not found in backlog: '{anchor}'")]
    EndAnchorNotFound { anchor: String },

    #[error("start anchor not found in backlog: '{anchor}'")]
    StartAnchorNotFound { anchor: String },

    #[error("backlog is empty")]
    EmptyBacklog,

    #[error("no line matched the selection")]
    NothingSelected,

    #[error("theme is not configured: set `dark = true|false` or pass --dark/--light")]
    ThemeNotConfigured,

    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("unknown color: {0}")]
    UnknownColor(String),

    #[error("cannot determine config directory")]
    ConfigDirectoryNotFound,

    #[error("invalid config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json line in {path} at line {line}: {source}")]
    InvalidJsonLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backlog line in {path} at line {line}: {reason}")]
    InvalidBacklogLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, LogexportError>;
