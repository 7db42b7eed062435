//! Error types for dc-frame

use thiserror::Error;

/// Tabular I/O and comparison errors
#[derive(Error, Debug)]
pub enum FrameError {
    /// F001: file could not be opened or written
    #[error("[F001] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// F002: malformed CSV
    #[error("[F002] CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// F003: spreadsheet could not be read
    #[error("[F003] Spreadsheet error in '{path}': {message}")]
    Excel { path: String, message: String },

    /// F004: rows and columns disagree
    #[error("[F004] Row {row} has {found} values, expected {expected}")]
    RowShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// F005: named column is not present
    #[error("[F005] Column '{0}' not found")]
    ColumnNotFound(String),

    /// F006: nothing to merge on
    #[error("[F006] Cannot compare: the two sides share no columns (left: {left}; right: {right})")]
    NoCommonColumns { left: String, right: String },

    /// F007: a shared column stayed incompatible after coercion
    #[error("[F007] Cannot compare column '{column}': {left} vs {right}")]
    IncompatibleColumn {
        column: String,
        left: String,
        right: String,
    },

    /// F008: JSON rendering failed
    #[error("[F008] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for FrameError
pub type FrameResult<T> = Result<T, FrameError>;
