//! # recordgate core
//!
//! Pure primitives for recordgate: who is calling, which record is meant,
//! what privilege level applies, and what a record holds.
//!
//! This crate contains no I/O, no storage, no locking. It defines the values
//! that the permission engine and the stores pass around.
//!
//! ## Key Types
//!
//! - [`Identity`] - An opaque 32-byte principal
//! - [`RecordKey`] - An opaque 32-byte record identifier (often content-derived)
//! - [`Role`] - A non-negative privilege level, `0` by default
//! - [`Timestamp`] - Absolute time in Unix seconds
//! - [`Record`] - Payload plus expiration, minimum role and allow-list
//! - [`Command`] - One owner-issued state mutation, the unit of atomic commit
//! - [`Snapshot`] - Owner, authorized set, roles and records in one value
//!
//! ## Encoding
//!
//! Records and commands encode to CBOR for storage. See [`Record::to_bytes`]
//! and [`Command::to_bytes`].

pub mod command;
pub mod error;
pub mod record;
pub mod snapshot;
pub mod types;

pub use command::Command;
pub use error::{CoreError, Result};
pub use record::{AllowList, Record};
pub use snapshot::Snapshot;
pub use types::{Identity, RecordKey, Role, Timestamp};
