//! Error types for the permissions module.
//!
//! Each variant is a stable reason a caller can match on. The `Display`
//! text is the canonical user-facing message and must not change.

use std::fmt;

use recordgate_core::{Identity, RecordKey, Role, Timestamp};
use thiserror::Error;

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// An administrative or write operation was called by someone other
    /// than the owner.
    #[error("Only the owner can perform this action.")]
    NotOwner { caller: Identity },

    /// The caller is not on the record's allow-list.
    #[error("You are not authorized to access this record.")]
    NotOnAllowList { caller: Identity, key: RecordKey },

    /// The caller's role is below the record's minimum.
    #[error("Your role is not high enough to access this record.")]
    RoleTooLow { required: Role, actual: Role },

    /// No record exists under the key.
    #[error("This record does not exist.")]
    NotFound { key: RecordKey },

    /// The record exists and the caller may read it, but it has expired.
    #[error("This record has expired.")]
    Expired { expiration: Timestamp, now: Timestamp },
}

impl AccessError {
    /// The coarse failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::NotOwner { .. }
            | AccessError::NotOnAllowList { .. }
            | AccessError::RoleTooLow { .. } => ErrorKind::Unauthorized,
            AccessError::NotFound { .. } => ErrorKind::NotFound,
            AccessError::Expired { .. } => ErrorKind::Expired,
        }
    }
}

/// Failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing ownership, allow-list membership or role level.
    Unauthorized,
    /// The referenced record does not exist.
    NotFound,
    /// The record's validity window has passed.
    Expired,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Expired => "Expired",
        };
        f.write_str(name)
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, AccessError>;
