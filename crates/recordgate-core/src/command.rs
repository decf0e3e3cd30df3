//! Commands: the owner-issued mutations of store state.
//!
//! Every state change goes through exactly one [`Command`]. A command is
//! authorized against the current state, committed to durable storage, and
//! only then applied in memory.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::record::Record;
use crate::types::{Identity, RecordKey, Role};

/// A single state mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Add an identity to the authorized set.
    AuthorizeUser { identity: Identity },

    /// Remove an identity from the authorized set.
    RemoveAuthorization { identity: Identity },

    /// Overwrite an identity's role.
    SetUserRole { identity: Identity, role: Role },

    /// Create or fully replace a record.
    SetRecord { key: RecordKey, record: Record },

    /// Remove a record.
    DeleteRecord { key: RecordKey },
}

impl Command {
    /// Short operation name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AuthorizeUser { .. } => "authorize_user",
            Command::RemoveAuthorization { .. } => "remove_authorization",
            Command::SetUserRole { .. } => "set_user_role",
            Command::SetRecord { .. } => "set_record",
            Command::DeleteRecord { .. } => "delete_record",
        }
    }

    /// The record key this command touches, if any.
    pub fn record_key(&self) -> Option<&RecordKey> {
        match self {
            Command::SetRecord { key, .. } | Command::DeleteRecord { key } => Some(key),
            _ => None,
        }
    }

    /// The identity this command targets, if any.
    pub fn target(&self) -> Option<&Identity> {
        match self {
            Command::AuthorizeUser { identity }
            | Command::RemoveAuthorization { identity }
            | Command::SetUserRole { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}
