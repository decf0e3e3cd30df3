//! Error types for the store module.

use recordgate_core::{CoreError, Identity};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record or allow-list encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] CoreError),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The store has no owner yet.
    #[error("store has not been initialized with an owner")]
    Uninitialized,

    /// The store already belongs to a different owner.
    #[error("store is owned by {stored}, not {requested}")]
    OwnerMismatch { stored: Identity, requested: Identity },

    /// A lock guarding the store was poisoned by a panicking thread.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// A blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
