//! # recordgate store
//!
//! Durable state backends for recordgate. Provides a trait-based interface
//! for persisting the owner, authorized set, role assignments and records,
//! with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait,
//! allowing the gate to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InitResult`] - Result of recording the owner
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recordgate_core::{Command, Identity};
//! use recordgate_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("records.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let owner = Identity::derive("owner");
//!     store.initialize(&owner).await.unwrap();
//!     store
//!         .commit(&Command::AuthorizeUser { identity: Identity::derive("alice") })
//!         .await
//!         .unwrap();
//!
//!     let snapshot = store.load().await.unwrap();
//!     assert_eq!(snapshot.authorized.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent initialization**: Recording the same owner twice returns `AlreadyInitialized`
//! - **Atomic commits**: Each command is applied in a single transaction
//! - **Explicit existence**: A deleted record has no row; role 0 has no row

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InitResult, Store};
