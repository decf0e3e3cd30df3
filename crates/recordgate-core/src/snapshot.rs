//! Snapshot: the complete state of one record store.
//!
//! A snapshot holds the owner and the three mutable maps. It applies
//! commands unconditionally; deciding *whether* a command may run is the
//! permission engine's job.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::record::Record;
use crate::types::{Identity, RecordKey, Role};

/// Owner, authorized set, role assignments and records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The single administrative identity.
    pub owner: Identity,

    /// Identities holding baseline authorization.
    pub authorized: BTreeSet<Identity>,

    /// Explicit role assignments. Absent means [`Role::NONE`].
    pub roles: BTreeMap<Identity, Role>,

    /// Live records. Absent means the key does not exist.
    pub records: BTreeMap<RecordKey, Record>,
}

impl Snapshot {
    /// Empty state owned by `owner`.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            authorized: BTreeSet::new(),
            roles: BTreeMap::new(),
            records: BTreeMap::new(),
        }
    }

    /// Role of `identity`, defaulting to [`Role::NONE`].
    pub fn role_of(&self, identity: &Identity) -> Role {
        self.roles.get(identity).copied().unwrap_or_default()
    }

    /// Apply a command. Returns whether any state changed.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::AuthorizeUser { identity } => self.authorized.insert(*identity),
            Command::RemoveAuthorization { identity } => self.authorized.remove(identity),
            Command::SetUserRole { identity, role } => {
                // Role 0 is the default, so it is stored as absence.
                let previous = if *role == Role::NONE {
                    self.roles.remove(identity)
                } else {
                    self.roles.insert(*identity, *role)
                };
                previous.unwrap_or_default() != *role
            }
            Command::SetRecord { key, record } => {
                let previous = self.records.insert(*key, record.clone());
                previous.as_ref() != Some(record)
            }
            Command::DeleteRecord { key } => self.records.remove(key).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    #[test]
    fn test_unset_role_is_zero() {
        let snapshot = Snapshot::new(Identity::derive("owner"));
        assert_eq!(snapshot.role_of(&Identity::derive("anyone")), Role::NONE);
    }

    #[test]
    fn test_role_zero_is_stored_as_absence() {
        let alice = Identity::derive("alice");
        let mut snapshot = Snapshot::new(Identity::derive("owner"));

        assert!(snapshot.apply(&Command::SetUserRole {
            identity: alice,
            role: Role::new(2),
        }));
        assert_eq!(snapshot.role_of(&alice), Role::new(2));

        assert!(snapshot.apply(&Command::SetUserRole {
            identity: alice,
            role: Role::NONE,
        }));
        assert!(snapshot.roles.is_empty());

        // Setting an unset identity to zero changes nothing.
        assert!(!snapshot.apply(&Command::SetUserRole {
            identity: alice,
            role: Role::NONE,
        }));
    }

    #[test]
    fn test_authorize_is_idempotent() {
        let alice = Identity::derive("alice");
        let mut snapshot = Snapshot::new(Identity::derive("owner"));

        assert!(snapshot.apply(&Command::AuthorizeUser { identity: alice }));
        assert!(!snapshot.apply(&Command::AuthorizeUser { identity: alice }));
        assert_eq!(snapshot.authorized.len(), 1);

        assert!(snapshot.apply(&Command::RemoveAuthorization { identity: alice }));
        assert!(!snapshot.apply(&Command::RemoveAuthorization { identity: alice }));
        assert!(snapshot.authorized.is_empty());
    }

    #[test]
    fn test_set_then_delete_record() {
        let key = RecordKey::derive("test");
        let mut snapshot = Snapshot::new(Identity::derive("owner"));
        let record = Record::new(&b"data"[..], Timestamp(10));

        assert!(snapshot.apply(&Command::SetRecord {
            key,
            record: record.clone(),
        }));
        assert!(!snapshot.apply(&Command::SetRecord { key, record }));
        assert!(snapshot.apply(&Command::DeleteRecord { key }));
        assert!(!snapshot.apply(&Command::DeleteRecord { key }));
        assert!(!snapshot.records.contains_key(&key));
    }
}
