//! # recordgate
//!
//! An access-controlled record store. A single owner grants authorization,
//! assigns roles, and publishes keyed records; each record carries an
//! expiration, a minimum role and an allow-list of readers.
//!
//! ## Overview
//!
//! - **Owner**: fixed at creation, the only identity allowed to write
//! - **Authorized set**: a global authorization flag per identity
//! - **Roles**: a privilege level per identity, `0` unless assigned
//! - **Records**: payloads readable only by listed, sufficiently privileged
//!   callers before the record expires
//!
//! Caller identity and the current time are explicit parameters. The gate
//! never authenticates callers and never reads the clock on its own.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recordgate::{GateConfig, RecordGate};
//! use recordgate::core::{Identity, Record, RecordKey, Role, Timestamp};
//! use recordgate::store::SqliteStore;
//!
//! async fn example() {
//!     let owner = Identity::derive("owner");
//!     let alice = Identity::derive("alice");
//!
//!     // Open storage
//!     let store = SqliteStore::open("records.db").unwrap();
//!
//!     // Create the gate
//!     let gate = RecordGate::create(owner, store, GateConfig::default())
//!         .await
//!         .unwrap();
//!
//!     // Publish a record for Alice
//!     let now = Timestamp::now();
//!     let key = RecordKey::derive("test");
//!     gate.set_user_role(&owner, alice, Role::new(1)).await.unwrap();
//!     gate.set_record(
//!         &owner,
//!         key,
//!         Record::new(&b"test data"[..], now.offset(3600))
//!             .with_min_role(Role::new(1))
//!             .allow(alice),
//!     )
//!     .await
//!     .unwrap();
//!
//!     // Read it back
//!     let data = gate.get_record(&alice, &key, now).await.unwrap();
//!     assert_eq!(&data[..], b"test data");
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `recordgate::core` - Core primitives (Identity, RecordKey, Record, etc.)
//! - `recordgate::perms` - The permission engine and access errors
//! - `recordgate::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod gate;

// Re-export component crates
pub use recordgate_core as core;
pub use recordgate_perms as perms;
pub use recordgate_store as store;

// Re-export main types for convenience
pub use config::GateConfig;
pub use error::{GateError, Result};
pub use gate::RecordGate;

// Re-export commonly used types
pub use recordgate_core::{Command, Identity, Record, RecordKey, Role, Snapshot, Timestamp};
pub use recordgate_perms::{AccessError, DeletePolicy, ErrorKind, ReadPolicy};
