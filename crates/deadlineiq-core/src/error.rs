//! Core error types for deadlineiq-core.
//!
//! Every fallible operation in the crate reports through this hierarchy.
//! Nothing here is fatal: the worst outcome at the crate boundary is an
//! empty or stale assignment collection.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for deadlineiq-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence failures (SQLite open/read/write)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration failures
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Field-level rejection on create/update
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backup document rejected on import
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Mutation referenced an assignment id that does not exist
    #[error("Assignment not found: {id}")]
    AssignmentNotFound { id: i64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked by another connection
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Field-level validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value for a named field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Required field is missing or empty
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Backup import errors. The whole document is rejected; nothing is
/// partially applied.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The document has no assignment list
    #[error("Backup document has no assignment list")]
    MissingAssignments,

    /// The document could not be parsed at all
    #[error("Malformed backup document: {0}")]
    Malformed(String),

    /// The document declares a version this build does not understand
    #[error("Unsupported backup version: {0}")]
    UnsupportedVersion(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
