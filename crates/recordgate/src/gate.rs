//! The RecordGate: unified API for recordgate.
//!
//! The gate brings the permission engine and durable storage together. It
//! holds the access state behind one async read/write lock:
//!
//! - every mutation takes the write lock, is authorized, is committed to the
//!   store, and only then is applied in memory
//! - reads share the read lock and always see fully applied state
//!
//! If the store fails to commit, the in-memory state is not touched. Once a
//! commit has started it runs to completion on its own task together with
//! the in-memory apply, so dropping the caller's future cannot leave the
//! store and the gate disagreeing.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use recordgate_core::{Command, Identity, Record, RecordKey, Role, Snapshot, Timestamp};
use recordgate_perms::{AccessError, AccessState};
use recordgate_store::{Store, StoreError};

use crate::config::GateConfig;
use crate::error::Result;

/// The main gate struct.
///
/// Provides a unified API for:
/// - Granting and revoking authorization
/// - Assigning roles
/// - Publishing, reading and deleting records
pub struct RecordGate<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: GateConfig,
    /// Access state, mirrored from the store.
    state: Arc<RwLock<AccessState>>,
}

impl<S: Store + 'static> RecordGate<S> {
    /// Create a gate over a fresh store owned by `owner`.
    ///
    /// Re-creating over a store that already belongs to `owner` resumes its
    /// state; a store owned by someone else is rejected.
    pub async fn create(owner: Identity, store: S, config: GateConfig) -> Result<Self> {
        store.initialize(&owner).await?;
        Self::open(store, config).await
    }

    /// Open a gate over an existing store.
    pub async fn open(store: S, config: GateConfig) -> Result<Self> {
        let snapshot = store.load().await?;

        info!(
            owner = %snapshot.owner,
            records = snapshot.records.len(),
            roles = snapshot.roles.len(),
            authorized = snapshot.authorized.len(),
            "record gate opened"
        );

        let state = AccessState::from_snapshot(snapshot)
            .with_read_policy(config.read_policy)
            .with_delete_policy(config.delete_policy);

        Ok(Self {
            store: Arc::new(store),
            config,
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The owner identity.
    pub async fn owner(&self) -> Identity {
        self.state.read().await.owner()
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administrative Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant baseline authorization to `identity`. Owner only; idempotent.
    pub async fn authorize_user(&self, caller: &Identity, identity: Identity) -> Result<()> {
        self.execute(caller, Command::AuthorizeUser { identity })
            .await
    }

    /// Revoke baseline authorization from `identity`. Owner only; idempotent.
    pub async fn remove_authorization(&self, caller: &Identity, identity: Identity) -> Result<()> {
        self.execute(caller, Command::RemoveAuthorization { identity })
            .await
    }

    /// Overwrite the role of `identity`. Owner only.
    pub async fn set_user_role(&self, caller: &Identity, identity: Identity, role: Role) -> Result<()> {
        self.execute(caller, Command::SetUserRole { identity, role })
            .await
    }

    /// The role of `identity`, [`Role::NONE`] if never set.
    pub async fn user_role(&self, identity: &Identity) -> Role {
        self.state.read().await.user_role(identity)
    }

    /// Whether `identity` is in the authorized set.
    pub async fn is_authorized(&self, identity: &Identity) -> bool {
        self.state.read().await.is_authorized(identity)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create or fully replace the record under `key`. Owner only.
    pub async fn set_record(&self, caller: &Identity, key: RecordKey, record: Record) -> Result<()> {
        self.execute(caller, Command::SetRecord { key, record })
            .await
    }

    /// Remove the record under `key`. Owner only.
    pub async fn delete_record(&self, caller: &Identity, key: RecordKey) -> Result<()> {
        self.execute(caller, Command::DeleteRecord { key })
            .await
    }

    /// Read the record under `key` as `caller` at time `now`.
    pub async fn get_record(
        &self,
        caller: &Identity,
        key: &RecordKey,
        now: Timestamp,
    ) -> Result<Bytes> {
        let state = self.state.read().await;

        match state.get_record(caller, key, now) {
            Ok(data) => {
                if self.config.audit {
                    debug!(caller = %caller, key = %key, len = data.len(), "record read");
                }
                Ok(data.clone())
            }
            Err(e) => {
                self.denied("get_record", caller, &e);
                Err(e.into())
            }
        }
    }

    /// Whether a record exists under `key`. Applies no read gates.
    pub async fn contains_record(&self, key: &RecordKey) -> bool {
        self.state.read().await.contains_record(key)
    }

    /// Number of live records.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.record_count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Authorize, commit, then apply one command under the write lock.
    ///
    /// Commit and apply run on a spawned task that owns the write guard.
    async fn execute(&self, caller: &Identity, command: Command) -> Result<()> {
        let mut state = Arc::clone(&self.state).write_owned().await;

        let op = command.name();
        let authorized = match state.authorize(caller, command) {
            Ok(authorized) => authorized,
            Err(e) => {
                self.denied(op, caller, &e);
                return Err(e.into());
            }
        };

        let store = Arc::clone(&self.store);
        let audit = self.config.audit;
        let caller = *caller;
        let task = tokio::spawn(async move {
            store.commit(authorized.command()).await?;
            let changed = state.apply(&authorized);

            if audit {
                let command = authorized.command();
                info!(
                    op = command.name(),
                    caller = %caller,
                    key = ?command.record_key(),
                    target = ?command.target(),
                    changed,
                    "command committed"
                );
            }

            Ok::<_, StoreError>(())
        });

        task.await
            .map_err(|e| StoreError::Task(format!("commit task failed: {}", e)))??;

        Ok(())
    }

    fn denied(&self, op: &str, caller: &Identity, error: &AccessError) {
        if self.config.audit {
            warn!(op, caller = %caller, kind = %error.kind(), reason = %error, "call denied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    use recordgate_perms::{DeletePolicy, ErrorKind, ReadPolicy};
    use recordgate_store::MemoryStore;
    use tracing_subscriber::fmt::MakeWriter;

    const NOW: Timestamp = Timestamp(1_700_000_000);

    async fn gate(owner: Identity) -> RecordGate<MemoryStore> {
        RecordGate::create(owner, MemoryStore::new(), GateConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let owner = Identity::derive("owner");
        let gate = gate(owner).await;
        assert_eq!(gate.owner().await, owner);
        assert_eq!(gate.store().owner().await.unwrap(), Some(owner));
    }

    #[tokio::test]
    async fn test_writes_reach_the_store() {
        let owner = Identity::derive("owner");
        let alice = Identity::derive("alice");
        let key = RecordKey::derive("test");
        let gate = gate(owner).await;

        gate.authorize_user(&owner, alice).await.unwrap();
        gate.set_user_role(&owner, alice, Role::new(2)).await.unwrap();
        gate.set_record(&owner, key, Record::new(&b"x"[..], NOW).allow(alice))
            .await
            .unwrap();

        let stored = gate.store().load().await.unwrap();
        assert_eq!(stored, gate.snapshot().await);
    }

    #[tokio::test]
    async fn test_denied_write_is_not_committed() {
        let owner = Identity::derive("owner");
        let mallory = Identity::derive("mallory");
        let gate = gate(owner).await;

        let err = gate.authorize_user(&mallory, mallory).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(err.to_string(), "Only the owner can perform this action.");
        assert!(gate.store().load().await.unwrap().authorized.is_empty());
    }

    #[tokio::test]
    async fn test_strict_delete() {
        let owner = Identity::derive("owner");
        let config = GateConfig {
            delete_policy: DeletePolicy::Strict,
            ..GateConfig::default()
        };
        let gate = RecordGate::create(owner, MemoryStore::new(), config)
            .await
            .unwrap();

        let err = gate
            .delete_record(&owner, RecordKey::derive("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_open_uninitialized_store_fails() {
        let result = RecordGate::open(MemoryStore::new(), GateConfig::default()).await;
        assert!(matches!(
            result,
            Err(crate::GateError::Store(StoreError::Uninitialized))
        ));
    }

    #[tokio::test]
    async fn test_read_policy_from_config() {
        let owner = Identity::derive("owner");
        let alice = Identity::derive("alice");
        let key = RecordKey::derive("test");
        let config =
            GateConfig::from_json(r#"{ "read_policy": "allow_list_and_authorized" }"#).unwrap();
        let gate = RecordGate::create(owner, MemoryStore::new(), config)
            .await
            .unwrap();

        gate.set_record(&owner, key, Record::new(&b"x"[..], NOW).allow(alice))
            .await
            .unwrap();

        let err = gate.get_record(&alice, &key, NOW).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(err.to_string(), "You are not authorized to access this record.");

        gate.authorize_user(&owner, alice).await.unwrap();
        assert_eq!(&gate.get_record(&alice, &key, NOW).await.unwrap()[..], b"x");

        // The default policy ignores the authorized set.
        let gate = RecordGate::create(owner, MemoryStore::new(), GateConfig::default())
            .await
            .unwrap();
        gate.set_record(&owner, key, Record::new(&b"x"[..], NOW).allow(alice))
            .await
            .unwrap();
        assert!(gate.get_record(&alice, &key, NOW).await.is_ok());
    }

    /// Collects formatted events in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn audited_calls(config: GateConfig) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let owner = Identity::derive("owner");
        let alice = Identity::derive("alice");
        let key = RecordKey::derive("test");
        let gate = RecordGate::create(owner, MemoryStore::new(), config)
            .await
            .unwrap();

        gate.set_record(&owner, key, Record::new(&b"secret payload"[..], NOW).allow(alice))
            .await
            .unwrap();
        gate.get_record(&alice, &key, NOW).await.unwrap();
        gate.authorize_user(&alice, alice).await.unwrap_err();

        captured.contents()
    }

    #[tokio::test]
    async fn test_audit_events() {
        let logs = audited_calls(GateConfig::default()).await;
        assert!(logs.contains("command committed"));
        assert!(logs.contains("record read"));
        assert!(logs.contains("call denied"));
        assert!(!logs.contains("secret payload"));

        let logs = audited_calls(GateConfig::default().without_audit()).await;
        assert!(!logs.contains("command committed"));
        assert!(!logs.contains("record read"));
        assert!(!logs.contains("call denied"));
    }
}
