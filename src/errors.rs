//! Crate-wide error type.
//!
//! Only the adapters around the scheduler fail: reading the task table,
//! loading settings, writing exports. Scheduling itself is total.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GanttError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task table has no id column. Found headers: {0:?}")]
    MissingIdColumn(Vec<String>),

    #[error("Unsupported task table format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, GanttError>;
