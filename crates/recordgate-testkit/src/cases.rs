//! Read-gate cases with known outcomes.
//!
//! Each case places one record and one reader in a fresh state and records
//! what a read must return. Gates are checked in order: existence, allow-list,
//! role, expiration; the first failing gate decides the error.

use recordgate_core::{Record, RecordKey, Role};
use recordgate_perms::{AccessState, ErrorKind, ReadPolicy};

use crate::fixtures::{TestFixture, FIXTURE_NOW};

/// A single read-gate case.
#[derive(Debug, Clone)]
pub struct ReadCase {
    /// Human-readable name for the case.
    pub name: &'static str,
    /// Whether the record exists at all.
    pub exists: bool,
    /// Whether the reader is on the allow-list.
    pub listed: bool,
    /// Whether the reader is in the authorized set.
    pub authorized: bool,
    /// Minimum role on the record.
    pub min_role: u64,
    /// Role held by the reader.
    pub reader_role: u64,
    /// Expiration relative to [`FIXTURE_NOW`], in seconds.
    pub expires_in: i64,
    /// Read policy in force.
    pub policy: ReadPolicy,
    /// Expected outcome; `None` means the read succeeds.
    pub expected: Option<ErrorKind>,
}

/// Get all read-gate cases.
pub fn all_cases() -> Vec<ReadCase> {
    let base = ReadCase {
        name: "",
        exists: true,
        listed: true,
        authorized: false,
        min_role: 1,
        reader_role: 1,
        expires_in: 3600,
        policy: ReadPolicy::AllowList,
        expected: None,
    };

    vec![
        ReadCase {
            name: "listed reader with exact role",
            ..base.clone()
        },
        ReadCase {
            name: "listed reader with higher role",
            reader_role: 9,
            ..base.clone()
        },
        ReadCase {
            name: "zero minimum role admits unassigned reader",
            min_role: 0,
            reader_role: 0,
            ..base.clone()
        },
        ReadCase {
            name: "expiring exactly now is still readable",
            expires_in: 0,
            ..base.clone()
        },
        ReadCase {
            name: "one second past expiration",
            expires_in: -1,
            expected: Some(ErrorKind::Expired),
            ..base.clone()
        },
        ReadCase {
            name: "role below minimum",
            min_role: 2,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "not on allow-list",
            listed: false,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "authorized set does not replace allow-list",
            listed: false,
            authorized: true,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "missing record beats every other gate",
            exists: false,
            listed: false,
            reader_role: 0,
            expires_in: -3600,
            expected: Some(ErrorKind::NotFound),
            ..base.clone()
        },
        ReadCase {
            name: "allow-list checked before role",
            listed: false,
            min_role: 5,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "role checked before expiration",
            min_role: 5,
            expires_in: -3600,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "strict policy rejects unauthorized listed reader",
            policy: ReadPolicy::AllowListAndAuthorized,
            expected: Some(ErrorKind::Unauthorized),
            ..base.clone()
        },
        ReadCase {
            name: "strict policy admits authorized listed reader",
            policy: ReadPolicy::AllowListAndAuthorized,
            authorized: true,
            ..base
        },
    ]
}

/// Build the state described by a case and perform the read.
///
/// Returns the error kind, or `None` if the read succeeded.
pub fn run_case(case: &ReadCase) -> Option<ErrorKind> {
    let fixture = TestFixture::with_seed(0x42);
    let key = RecordKey::derive(case.name);
    let state = case_state(case, &fixture, key);

    state
        .get_record(&fixture.alice, &key, FIXTURE_NOW)
        .err()
        .map(|e| e.kind())
}

fn case_state(case: &ReadCase, fixture: &TestFixture, key: RecordKey) -> AccessState {
    let owner = fixture.owner;
    let mut state = AccessState::new(owner).with_read_policy(case.policy);

    state
        .set_user_role(&owner, fixture.alice, Role::new(case.reader_role))
        .expect("owner sets roles");
    if case.authorized {
        state
            .authorize_user(&owner, fixture.alice)
            .expect("owner authorizes");
    }
    if case.exists {
        let mut record = Record::new(&b"case data"[..], FIXTURE_NOW.offset(case.expires_in))
            .with_min_role(Role::new(case.min_role))
            .allow(fixture.bob);
        if case.listed {
            record = record.allow(fixture.alice);
        }
        state
            .set_record(&owner, key, record)
            .expect("owner publishes");
    }

    state
}

/// Run every case, returning the names of those that disagree with their
/// expected outcome.
pub fn failing_cases() -> Vec<&'static str> {
    all_cases()
        .iter()
        .filter(|case| run_case(case) != case.expected)
        .map(|case| case.name)
        .collect()
}
