//! Core error types for barberq-core.
//!
//! Most failure paths in the engine have a defined fallback (defaults,
//! empty collections, no-ops) and never surface here. What remains are the
//! errors a caller can actually act on: a bad config key, an unknown
//! service name or id, or a storage backend that could not be opened.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for barberq-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Write rejected by the backend (quota, read-only medium, test doubles)
    #[error("Write rejected for key '{key}': {message}")]
    WriteRejected { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key does not name a configuration field
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for a non-numeric field
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Unrecognised service key
    #[error("unknown service '{0}' (expected one of: cut, cut_seal, cut_beard, cut_beard_seal, color, perm)")]
    UnknownService(String),

    /// Unrecognised speed key
    #[error("unknown speed '{0}' (expected one of: fast, normal, slow)")]
    UnknownSpeed(String),

    /// No waiting client with this id
    #[error("no queued client with id {0}")]
    UnknownQueueItem(String),

    /// No day log entry with this id
    #[error("no log entry with id {0}")]
    UnknownLogEntry(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_message_names_the_key() {
        let err = CoreError::from(ConfigError::UnknownKey("limits.7.hour".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown config key: limits.7.hour"
        );
    }

    #[test]
    fn unknown_ids_are_named() {
        assert_eq!(
            ValidationError::UnknownQueueItem("q-1".into()).to_string(),
            "no queued client with id q-1"
        );
        assert_eq!(
            ValidationError::UnknownLogEntry("e-9".into()).to_string(),
            "no log entry with id e-9"
        );
    }

    #[test]
    fn rusqlite_generic_error_maps_to_query_failed() {
        let err = StorageError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
