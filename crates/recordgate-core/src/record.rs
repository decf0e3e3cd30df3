//! Records: keyed payloads guarded by an expiration, a minimum role and an
//! explicit allow-list of readers.

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{Identity, Role, Timestamp};

/// The set of identities permitted to read one record.
pub type AllowList = BTreeSet<Identity>;

/// A stored record.
///
/// A record is always written as a whole. There is no partial update: the
/// owner replaces every field at once, so readers either see the previous
/// record or the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload.
    pub data: Bytes,

    /// After this instant the record can no longer be read.
    pub expiration: Timestamp,

    /// Minimum role a reader must hold.
    pub min_role: Role,

    /// Identities permitted to read this record.
    pub allow_list: AllowList,
}

impl Record {
    /// Create a record with no role requirement and an empty allow-list.
    pub fn new(data: impl Into<Bytes>, expiration: Timestamp) -> Self {
        Self {
            data: data.into(),
            expiration,
            min_role: Role::NONE,
            allow_list: AllowList::new(),
        }
    }

    /// Require at least `role` to read.
    pub fn with_min_role(mut self, role: Role) -> Self {
        self.min_role = role;
        self
    }

    /// Add one reader to the allow-list.
    pub fn allow(mut self, identity: Identity) -> Self {
        self.allow_list.insert(identity);
        self
    }

    /// Replace the allow-list.
    pub fn with_allow_list(mut self, readers: impl IntoIterator<Item = Identity>) -> Self {
        self.allow_list = readers.into_iter().collect();
        self
    }

    /// Whether `identity` is on this record's allow-list.
    pub fn allows(&self, identity: &Identity) -> bool {
        self.allow_list.contains(identity)
    }

    /// Whether the record is unreadable at `now`.
    ///
    /// The expiration instant itself is still valid.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expiration
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

/// Encode an allow-list on its own, for stores that keep it in a column.
pub fn encode_allow_list(allow_list: &AllowList) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(allow_list, &mut buf)
        .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode an allow-list written by [`encode_allow_list`].
pub fn decode_allow_list(bytes: &[u8]) -> Result<AllowList> {
    if bytes.is_empty() {
        return Ok(AllowList::new());
    }
    ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}
