//! # Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / io::Error                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError ← one backend failed (logged by the writer, never        │
//! │       │         surfaced from a mutation)                               │
//! │       ▼                                                                 │
//! │  StoreError   ← what LocalStore callers see                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow in the CLI                                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharmalife_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Storage Error
// =============================================================================

/// A storage backend operation failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite query or connection failure.
    #[error("SQLite error: {0}")]
    Sqlite(String),

    /// Embedded migrations could not be applied.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation (closed pool, simulated outage).
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => StorageError::Unavailable("pool is closed".to_string()),
            sqlx::Error::PoolTimedOut => {
                StorageError::Unavailable("timed out acquiring a connection".to_string())
            }
            other => StorageError::Sqlite(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::Migration(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Store Error
// =============================================================================

/// Errors returned by `LocalStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id in the collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A backup could not be restored. The repository is unchanged.
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    /// The record failed field validation. The repository is unchanged.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidBackup(msg) => StoreError::InvalidBackup(msg),
            CoreError::Validation(e) => StoreError::Validation(e),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        StoreError::Config(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
