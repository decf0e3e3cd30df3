//! Error types for the gate.

use recordgate_perms::{AccessError, ErrorKind};
use recordgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// The caller was refused. Displays the canonical message unchanged.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Storage error. In-memory state was left untouched.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl GateError {
    /// The access failure category, or `None` for infrastructure failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GateError::Access(e) => Some(e.kind()),
            GateError::Store(_) | GateError::Config(_) => None,
        }
    }

    /// The access refusal, if this is one.
    pub fn as_access(&self) -> Option<&AccessError> {
        match self {
            GateError::Access(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
