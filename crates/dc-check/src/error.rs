//! Error types for dc-check

use thiserror::Error;

/// Errors raised while running checks, loads and pipeline steps.
///
/// These never escape a check: the check boundary turns them into a
/// `FailedWithException` result.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error(transparent)]
    Core(#[from] dc_core::CoreError),

    #[error(transparent)]
    Db(#[from] dc_db::DbError),

    #[error(transparent)]
    Frame(#[from] dc_frame::FrameError),

    #[error(transparent)]
    Jinja(#[from] dc_jinja::JinjaError),

    /// E001: file could not be read or written
    #[error("[E001] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// E002: an output file was requested for a statement without rows
    #[error("[E002] Statement returns no result set; cannot write {target}")]
    NoResultSet { target: String },

    /// E003: subprocess could not be started
    #[error("[E003] Failed to run command '{command}': {source}")]
    Command {
        command: String,
        source: std::io::Error,
    },

    /// E004: expectation or load file has an unsupported extension
    #[error("[E004] Unsupported file type: {path} (expected .csv or .xlsx)")]
    UnsupportedFile { path: String },

    /// P001: pipeline step kind not recognised
    #[error("[P001] Unknown pipeline step kind '{kind}'")]
    UnknownStep { kind: String },

    /// P002: pipeline step parameters are malformed
    #[error("[P002] Invalid '{kind}' step: {message}")]
    InvalidStep { kind: String, message: String },

    /// P003: pipeline file is malformed
    #[error("[P003] Invalid pipeline {path}: {message}")]
    InvalidPipeline { path: String, message: String },

    /// L001: upsert target does not exist
    #[error("[L001] Cannot upsert into {table}: table does not exist")]
    UpsertMissingTable { table: String },

    /// L002: upsert target has no primary key
    #[error("[L002] Cannot upsert into {table}: no primary key declared")]
    UpsertWithoutKeys { table: String },

    /// L003: an explicit table name with several files
    #[error("[L003] A table name can only be given for a single file, got {count}")]
    TableWithManyFiles { count: usize },
}

impl ExecError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ExecError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for ExecError
pub type ExecResult<T> = Result<T, ExecError>;
