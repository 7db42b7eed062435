//! Error types for dc-core

use thiserror::Error;

/// Core error type for data-check
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: no data_check.yml in {path} or any parent directory")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Connection name not present in `connections`
    #[error("[C004] Unknown connection '{name}'. Known connections: {known}")]
    UnknownConnection { name: String, known: String },

    /// C005: No connection selected and no `default_connection`
    #[error("[C005] No connection given and no default_connection configured")]
    NoDefaultConnection,

    /// C006: Load mode string not recognised
    #[error("[C006] Unknown load mode '{value}'. Expected one of: truncate, append, replace, upsert")]
    InvalidLoadMode { value: String },

    /// C007: Table reference could not be parsed
    #[error("[C007] Invalid table name '{value}'")]
    InvalidTableName { value: String },

    /// C008: IO error with file path context
    #[error("[C008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C009: Template data file is not a mapping
    #[error("[C009] Template data in {path} must be a YAML mapping")]
    TemplateDataInvalid { path: String },

    /// C010: YAML parse error
    #[error("[C010] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
