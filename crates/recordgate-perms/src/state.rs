//! Access state: the sequential permission engine.
//!
//! [`AccessState`] owns a [`Snapshot`] and decides, for every call, whether
//! the caller may perform it. Mutations take `&mut self` and reads take
//! `&self`, so a single value is a strictly sequential state machine; any
//! sharing between threads is the caller's concern.
//!
//! Each mutation is split into two steps so that a durable store can sit
//! between them:
//!
//! 1. [`AccessState::authorize`] checks the command against current state
//!    and hands back an [`Authorized`] command
//! 2. [`AccessState::apply`] performs it
//!
//! `apply` only accepts an [`Authorized`], which only `authorize` can build,
//! so no path mutates state without the owner check.
//!
//! The convenience methods (`authorize_user`, `set_record`, ...) run both.

use bytes::Bytes;

use recordgate_core::{Command, Identity, Record, RecordKey, Role, Snapshot, Timestamp};

use crate::error::{AccessError, Result};
use crate::policy::{DeletePolicy, ReadPolicy};

/// A command that passed [`AccessState::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    command: Command,
}

impl Authorized {
    /// The checked command.
    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// Aggregated access state for one store.
#[derive(Debug, Clone)]
pub struct AccessState {
    /// Owner, authorized set, roles and records.
    snapshot: Snapshot,

    /// How the allow-list gate treats the authorized set.
    read_policy: ReadPolicy,

    /// Whether deleting a missing record is an error.
    delete_policy: DeletePolicy,
}

impl AccessState {
    /// Create empty state owned by `owner`.
    pub fn new(owner: Identity) -> Self {
        Self::from_snapshot(Snapshot::new(owner))
    }

    /// Resume from previously persisted state.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            read_policy: ReadPolicy::default(),
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Set the read policy.
    pub fn with_read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Set the delete policy.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// The owner identity.
    pub fn owner(&self) -> Identity {
        self.snapshot.owner
    }

    /// Borrow the underlying state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Check whether `caller` may execute `command` right now.
    ///
    /// Ownership is checked first for every command. Under
    /// [`DeletePolicy::Strict`], deleting a missing record then fails with
    /// `NotFound`.
    pub fn authorize(&self, caller: &Identity, command: Command) -> Result<Authorized> {
        self.require_owner(caller)?;

        if let Command::DeleteRecord { key } = &command {
            if self.delete_policy == DeletePolicy::Strict && !self.contains_record(key) {
                return Err(AccessError::NotFound { key: *key });
            }
        }

        Ok(Authorized { command })
    }

    /// Apply an authorized command. Returns whether state changed.
    ///
    /// The command must have been authorized against this state with no
    /// other mutation in between.
    pub fn apply(&mut self, authorized: &Authorized) -> bool {
        self.snapshot.apply(&authorized.command)
    }

    /// Authorize and apply in one step.
    pub fn execute(&mut self, caller: &Identity, command: Command) -> Result<bool> {
        let authorized = self.authorize(caller, command)?;
        Ok(self.apply(&authorized))
    }

    fn require_owner(&self, caller: &Identity) -> Result<()> {
        if *caller == self.snapshot.owner {
            Ok(())
        } else {
            Err(AccessError::NotOwner { caller: *caller })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administrative Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant baseline authorization to `identity`. Idempotent.
    pub fn authorize_user(&mut self, caller: &Identity, identity: Identity) -> Result<()> {
        self.execute(caller, Command::AuthorizeUser { identity })
            .map(|_| ())
    }

    /// Revoke baseline authorization from `identity`. Idempotent.
    pub fn remove_authorization(&mut self, caller: &Identity, identity: Identity) -> Result<()> {
        self.execute(caller, Command::RemoveAuthorization { identity })
            .map(|_| ())
    }

    /// Overwrite the role of `identity`.
    pub fn set_user_role(&mut self, caller: &Identity, identity: Identity, role: Role) -> Result<()> {
        self.execute(caller, Command::SetUserRole { identity, role })
            .map(|_| ())
    }

    /// The role of `identity`, [`Role::NONE`] if never set.
    pub fn user_role(&self, identity: &Identity) -> Role {
        self.snapshot.role_of(identity)
    }

    /// Whether `identity` is in the authorized set.
    pub fn is_authorized(&self, identity: &Identity) -> bool {
        self.snapshot.authorized.contains(identity)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create or fully replace the record under `key`.
    ///
    /// The expiration is not validated; a record written already expired is
    /// simply unreadable.
    pub fn set_record(&mut self, caller: &Identity, key: RecordKey, record: Record) -> Result<()> {
        self.execute(caller, Command::SetRecord { key, record })
            .map(|_| ())
    }

    /// Remove the record under `key`.
    pub fn delete_record(&mut self, caller: &Identity, key: RecordKey) -> Result<()> {
        self.execute(caller, Command::DeleteRecord { key })
            .map(|_| ())
    }

    /// Read the record under `key` as `caller` at time `now`.
    ///
    /// Gates are evaluated in a fixed order and the first failure wins:
    /// existence, allow-list, role, expiration.
    pub fn get_record(&self, caller: &Identity, key: &RecordKey, now: Timestamp) -> Result<&Bytes> {
        self.check_read(caller, key, now).map(|record| &record.data)
    }

    /// Run every read gate and return the whole record on success.
    pub fn check_read(&self, caller: &Identity, key: &RecordKey, now: Timestamp) -> Result<&Record> {
        let record = self
            .snapshot
            .records
            .get(key)
            .ok_or(AccessError::NotFound { key: *key })?;

        let listed = record.allows(caller)
            && match self.read_policy {
                ReadPolicy::AllowList => true,
                ReadPolicy::AllowListAndAuthorized => self.is_authorized(caller),
            };
        if !listed {
            return Err(AccessError::NotOnAllowList {
                caller: *caller,
                key: *key,
            });
        }

        let actual = self.user_role(caller);
        if !actual.satisfies(record.min_role) {
            return Err(AccessError::RoleTooLow {
                required: record.min_role,
                actual,
            });
        }

        if record.is_expired(now) {
            return Err(AccessError::Expired {
                expiration: record.expiration,
                now,
            });
        }

        Ok(record)
    }

    /// Whether a record exists under `key`. Applies no read gates.
    pub fn contains_record(&self, key: &RecordKey) -> bool {
        self.snapshot.records.contains_key(key)
    }

    /// Number of live records.
    pub fn record_count(&self) -> usize {
        self.snapshot.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const NOW: Timestamp = Timestamp(1_700_000_000);

    struct Accounts {
        owner: Identity,
        alice: Identity,
        bob: Identity,
    }

    fn accounts() -> Accounts {
        Accounts {
            owner: Identity::derive("owner"),
            alice: Identity::derive("alice"),
            bob: Identity::derive("bob"),
        }
    }

    fn test_record(reader: Identity, expiration: Timestamp) -> Record {
        Record::new(&b"test data"[..], expiration)
            .with_min_role(Role::new(1))
            .allow(reader)
    }

    #[test]
    fn test_owner_is_fixed_at_creation() {
        let a = accounts();
        let state = AccessState::new(a.owner);
        assert_eq!(state.owner(), a.owner);
    }

    #[test]
    fn test_authorize_and_remove() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);

        state.authorize_user(&a.owner, a.alice).unwrap();
        assert!(state.is_authorized(&a.alice));

        state.remove_authorization(&a.owner, a.alice).unwrap();
        assert!(!state.is_authorized(&a.alice));
    }

    #[test]
    fn test_set_user_role() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);

        assert_eq!(state.user_role(&a.alice), Role::NONE);
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        assert_eq!(state.user_role(&a.alice), Role::new(1));
        state.set_user_role(&a.owner, a.alice, Role::new(5)).unwrap();
        assert_eq!(state.user_role(&a.alice), Role::new(5));
    }

    #[test]
    fn test_non_owner_cannot_mutate() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(3600)))
            .unwrap();
        let before = state.snapshot().clone();

        let attempts = [
            state.clone().authorize_user(&a.bob, a.bob),
            state.clone().remove_authorization(&a.bob, a.alice),
            state.clone().set_user_role(&a.bob, a.bob, Role::new(9)),
            state.clone().set_record(&a.bob, key, test_record(a.bob, NOW)),
            state.clone().delete_record(&a.bob, key),
        ];
        for result in attempts {
            let err = result.unwrap_err();
            assert_eq!(err, AccessError::NotOwner { caller: a.bob });
            assert_eq!(err.to_string(), "Only the owner can perform this action.");
        }

        for command in [
            Command::AuthorizeUser { identity: a.bob },
            Command::DeleteRecord { key },
        ] {
            assert!(state.execute(&a.bob, command).is_err());
        }
        assert_eq!(state.snapshot(), &before);
    }

    #[test]
    fn test_only_authorized_commands_apply() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let command = Command::SetUserRole {
            identity: a.alice,
            role: Role::new(3),
        };

        let err = state.authorize(&a.bob, command.clone()).unwrap_err();
        assert_eq!(err, AccessError::NotOwner { caller: a.bob });
        assert_eq!(state.user_role(&a.alice), Role::NONE);

        let authorized = state.authorize(&a.owner, command.clone()).unwrap();
        assert_eq!(authorized.command(), &command);
        assert!(state.apply(&authorized));
        assert_eq!(state.user_role(&a.alice), Role::new(3));
        assert!(!state.apply(&authorized));
    }

    #[test]
    fn test_gate_order_missing_record_first() {
        let a = accounts();
        let state = AccessState::new(a.owner);

        // Bob fails every other gate too, but existence is checked first.
        let err = state
            .get_record(&a.bob, &RecordKey::derive("never-set"), NOW)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "This record does not exist.");
    }

    #[test]
    fn test_gate_order_allow_list_before_role_and_expiry() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(-3600)))
            .unwrap();

        let err = state.get_record(&a.bob, &key, NOW).unwrap_err();
        assert!(matches!(err, AccessError::NotOnAllowList { .. }));

        // Alice is listed but role 0: role comes before expiry.
        let err = state.get_record(&a.alice, &key, NOW).unwrap_err();
        assert_eq!(
            err,
            AccessError::RoleTooLow {
                required: Role::new(1),
                actual: Role::NONE,
            }
        );

        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        let err = state.get_record(&a.alice, &key, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");

        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(3600)))
            .unwrap();

        assert_eq!(
            state.get_record(&a.alice, &key, NOW).unwrap().as_ref(),
            b"test data"
        );

        let err = state.get_record(&a.bob, &key, NOW).unwrap_err();
        assert_eq!(err.to_string(), "You are not authorized to access this record.");

        state.set_user_role(&a.owner, a.alice, Role::NONE).unwrap();
        let err = state.get_record(&a.alice, &key, NOW).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your role is not high enough to access this record."
        );

        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(-3600)))
            .unwrap();
        let err = state.get_record(&a.alice, &key, NOW).unwrap_err();
        assert_eq!(err.to_string(), "This record has expired.");
    }

    #[test]
    fn test_expiration_instant_is_readable() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW))
            .unwrap();

        assert!(state.get_record(&a.alice, &key, NOW).is_ok());
        assert!(state.get_record(&a.alice, &key, NOW.offset(1)).is_err());
    }

    #[test]
    fn test_set_record_replaces_allow_list() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state.set_user_role(&a.owner, a.bob, Role::new(1)).unwrap();

        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(60)))
            .unwrap();
        state
            .set_record(&a.owner, key, test_record(a.bob, NOW.offset(60)))
            .unwrap();

        assert!(state.get_record(&a.alice, &key, NOW).is_err());
        assert!(state.get_record(&a.bob, &key, NOW).is_ok());
    }

    #[test]
    fn test_delete_then_read_is_not_found() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(60)))
            .unwrap();
        assert!(state.contains_record(&key));

        state.delete_record(&a.owner, key).unwrap();
        assert!(!state.contains_record(&key));
        assert_eq!(state.record_count(), 0);
        assert_eq!(
            state.get_record(&a.alice, &key, NOW).unwrap_err(),
            AccessError::NotFound { key }
        );
    }

    #[test]
    fn test_delete_missing_policies() {
        let a = accounts();
        let key = RecordKey::derive("missing");

        let mut lenient = AccessState::new(a.owner);
        assert!(lenient.delete_record(&a.owner, key).is_ok());

        let mut strict = AccessState::new(a.owner).with_delete_policy(DeletePolicy::Strict);
        assert_eq!(
            strict.delete_record(&a.owner, key).unwrap_err(),
            AccessError::NotFound { key }
        );
        // Ownership is still checked first.
        assert_eq!(
            strict.delete_record(&a.bob, key).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_authorized_set_does_not_gate_reads_by_default() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state.set_user_role(&a.owner, a.bob, Role::new(1)).unwrap();
        state.authorize_user(&a.owner, a.bob).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(60)))
            .unwrap();

        // Alice is not globally authorized but is listed.
        assert!(state.get_record(&a.alice, &key, NOW).is_ok());
        // Bob is globally authorized but not listed.
        assert!(matches!(
            state.get_record(&a.bob, &key, NOW),
            Err(AccessError::NotOnAllowList { .. })
        ));
    }

    #[test]
    fn test_allow_list_and_authorized_policy() {
        let a = accounts();
        let mut state =
            AccessState::new(a.owner).with_read_policy(ReadPolicy::AllowListAndAuthorized);
        let key = RecordKey::derive("test");
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(60)))
            .unwrap();

        assert!(matches!(
            state.get_record(&a.alice, &key, NOW),
            Err(AccessError::NotOnAllowList { .. })
        ));

        state.authorize_user(&a.owner, a.alice).unwrap();
        assert!(state.get_record(&a.alice, &key, NOW).is_ok());
    }

    #[test]
    fn test_reads_do_not_mutate() {
        let a = accounts();
        let mut state = AccessState::new(a.owner);
        let key = RecordKey::derive("test");
        state.set_user_role(&a.owner, a.alice, Role::new(1)).unwrap();
        state
            .set_record(&a.owner, key, test_record(a.alice, NOW.offset(60)))
            .unwrap();
        let before = state.snapshot().clone();

        let _ = state.get_record(&a.alice, &key, NOW);
        let _ = state.get_record(&a.bob, &key, NOW);
        let _ = state.get_record(&a.alice, &key, NOW.offset(120));

        assert_eq!(state.snapshot(), &before);
    }
}
