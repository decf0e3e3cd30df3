//! Store trait: the abstract interface for durable record-store state.
//!
//! This trait lets the gate stay storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use recordgate_core::{Command, Identity, Snapshot};

use crate::error::Result;

/// Result of initializing a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    /// The owner was recorded.
    Initialized,
    /// The same owner was already recorded (idempotent - not an error).
    AlreadyInitialized,
}

/// The Store trait: async interface for state persistence.
///
/// All methods are async to support both blocking (SQLite) and native async
/// backends. For SQLite, `spawn_blocking` is used internally to avoid
/// blocking the runtime.
///
/// # Design Notes
///
/// - **One owner**: `initialize` records the owner once. A second call with
///   the same owner is a no-op; a different owner is `OwnerMismatch`.
/// - **Atomic commit**: `commit` applies exactly one [`Command`]; either all
///   of it is durable or none of it is.
/// - **No authorization**: the store persists whatever it is handed. Callers
///   must authorize commands first.
#[async_trait]
pub trait Store: Send + Sync {
    /// Record the owner of a new store.
    async fn initialize(&self, owner: &Identity) -> Result<InitResult>;

    /// The recorded owner, if the store has been initialized.
    async fn owner(&self) -> Result<Option<Identity>>;

    /// Durably apply one command.
    async fn commit(&self, command: &Command) -> Result<()>;

    /// Load the full state.
    ///
    /// Fails with `Uninitialized` if no owner has been recorded.
    async fn load(&self) -> Result<Snapshot>;
}
