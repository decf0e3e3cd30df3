//! # recordgate permissions
//!
//! The rules that decide who may create, update, delete and read a record.
//!
//! ## Overview
//!
//! A store has exactly one owner. Only the owner may:
//!
//! - grant or revoke baseline authorization
//! - assign roles
//! - create, replace or delete records
//!
//! Anyone may ask for a role or an authorization flag. Reading a record runs
//! four gates in a fixed order, and the first failure wins:
//!
//! 1. **Existence**: the key must hold a record
//! 2. **Allow-list**: the caller must be listed on that record
//! 3. **Role**: the caller's role must be at least the record's minimum
//! 4. **Expiration**: the current time must not be past the record's expiration
//!
//! ## Usage
//!
//! ```rust
//! use recordgate_core::{Identity, Record, RecordKey, Role, Timestamp};
//! use recordgate_perms::{AccessState, ErrorKind};
//!
//! let owner = Identity::derive("owner");
//! let alice = Identity::derive("alice");
//! let key = RecordKey::derive("test");
//! let now = Timestamp::from_secs(1_700_000_000);
//!
//! let mut state = AccessState::new(owner);
//! state.set_user_role(&owner, alice, Role::new(1)).unwrap();
//! state
//!     .set_record(
//!         &owner,
//!         key,
//!         Record::new(&b"test data"[..], now.offset(3600))
//!             .with_min_role(Role::new(1))
//!             .allow(alice),
//!     )
//!     .unwrap();
//!
//! assert_eq!(&state.get_record(&alice, &key, now).unwrap()[..], b"test data");
//! assert_eq!(
//!     state.get_record(&owner, &key, now).unwrap_err().kind(),
//!     ErrorKind::Unauthorized,
//! );
//! ```

pub mod error;
pub mod policy;
pub mod state;

pub use error::{AccessError, ErrorKind, Result};
pub use policy::{DeletePolicy, ReadPolicy};
pub use state::{AccessState, Authorized};
