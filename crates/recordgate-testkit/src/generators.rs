//! Proptest generators for property-based testing.

use proptest::prelude::*;

use recordgate_core::{Identity, Record, RecordKey, Role, Timestamp};

/// Generate a random Identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(Identity::from_bytes)
}

/// Generate a random RecordKey.
pub fn record_key() -> impl Strategy<Value = RecordKey> {
    any::<[u8; 32]>().prop_map(RecordKey::from_bytes)
}

/// Generate a role, biased toward small levels.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        3 => (0u64..=8).prop_map(Role::new),
        1 => any::<u64>().prop_map(Role::new),
    ]
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..=4_000_000_000i64).prop_map(Timestamp::from_secs)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a record with up to `max_readers` listed readers.
pub fn record(max_readers: usize) -> impl Strategy<Value = Record> {
    (
        payload(256),
        timestamp(),
        role(),
        prop::collection::btree_set(identity(), 0..=max_readers),
    )
        .prop_map(|(data, expiration, min_role, readers)| {
            Record::new(data, expiration)
                .with_min_role(min_role)
                .with_allow_list(readers)
        })
}

/// Parameters for a single reader against a single record.
#[derive(Debug, Clone)]
pub struct ReadParams {
    pub owner: Identity,
    pub reader: Identity,
    pub key: RecordKey,
    pub data: Vec<u8>,
    pub min_role: Role,
    pub reader_role: Role,
    pub listed: bool,
    pub expiration: Timestamp,
    pub now: Timestamp,
}

impl Arbitrary for ReadParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            identity(),
            identity(),
            record_key(),
            payload(128),
            role(),
            role(),
            any::<bool>(),
            timestamp(),
            timestamp(),
        )
            .prop_filter("owner and reader differ", |(owner, reader, ..)| {
                owner != reader
            })
            .prop_map(
                |(owner, reader, key, data, min_role, reader_role, listed, expiration, now)| {
                    ReadParams {
                        owner,
                        reader,
                        key,
                        data,
                        min_role,
                        reader_role,
                        listed,
                        expiration,
                        now,
                    }
                },
            )
            .boxed()
    }
}

impl ReadParams {
    /// The record these parameters describe.
    pub fn record(&self) -> Record {
        let record = Record::new(self.data.clone(), self.expiration).with_min_role(self.min_role);
        if self.listed {
            record.allow(self.reader)
        } else {
            record
        }
    }

    /// Whether every read gate should let the reader through.
    pub fn should_succeed(&self) -> bool {
        self.listed && self.reader_role >= self.min_role && self.now <= self.expiration
    }
}
