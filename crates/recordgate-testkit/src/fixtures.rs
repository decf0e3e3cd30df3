//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::RngCore;

use recordgate::{GateConfig, RecordGate};
use recordgate_core::{Identity, Record, RecordKey, Role, Timestamp};
use recordgate_perms::AccessState;
use recordgate_store::MemoryStore;

/// A fixed point in time most fixtures measure expirations from.
pub const FIXTURE_NOW: Timestamp = Timestamp(1_700_000_000);

/// An owner and two other parties.
///
/// `alice` is the usual reader, `bob` the usual outsider.
#[derive(Debug, Clone, Copy)]
pub struct TestFixture {
    pub owner: Identity,
    pub alice: Identity,
    pub bob: Identity,
}

impl TestFixture {
    /// Create a fixture with random identities.
    pub fn new() -> Self {
        Self {
            owner: Identity::generate(),
            alice: Identity::generate(),
            bob: Identity::generate(),
        }
    }

    /// Create with deterministic identities from seed.
    pub fn with_seed(seed: u8) -> Self {
        Self {
            owner: Identity::from_bytes([seed; 32]),
            alice: Identity::from_bytes([seed.wrapping_add(1); 32]),
            bob: Identity::from_bytes([seed.wrapping_add(2); 32]),
        }
    }

    /// Derive a record key for a given name.
    pub fn key(&self, name: &str) -> RecordKey {
        RecordKey::derive(name)
    }

    /// An empty access state owned by `owner`.
    pub fn state(&self) -> AccessState {
        AccessState::new(self.owner)
    }

    /// An access state where `alice` holds `role` and may read `key` until
    /// one hour after [`FIXTURE_NOW`].
    pub fn state_with_record(&self, key: RecordKey, data: &[u8], role: Role) -> AccessState {
        let mut state = self.state();
        let record = self.readable_record(data, role, FIXTURE_NOW.offset(3600));

        state
            .set_user_role(&self.owner, self.alice, role)
            .expect("owner sets roles");
        state
            .set_record(&self.owner, key, record)
            .expect("owner publishes");
        state
    }

    /// A record `alice` may read while holding at least `min_role`.
    pub fn readable_record(&self, data: &[u8], min_role: Role, expiration: Timestamp) -> Record {
        Record::new(data.to_vec(), expiration)
            .with_min_role(min_role)
            .allow(self.alice)
    }

    /// A gate over a fresh memory store, audit events off.
    pub async fn gate(&self) -> RecordGate<MemoryStore> {
        RecordGate::create(
            self.owner,
            MemoryStore::new(),
            GateConfig::default().without_audit(),
        )
        .await
        .expect("memory store initializes")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create distinct identities for multi-party tests.
pub fn multi_party_identities(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| Identity::derive(&format!("party-{}", i)))
        .collect()
}

/// Random payload bytes.
pub fn random_payload(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}
