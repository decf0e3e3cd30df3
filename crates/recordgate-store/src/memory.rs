//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::sync::RwLock;

use async_trait::async_trait;

use recordgate_core::{Command, Identity, Snapshot};

use crate::error::{Result, StoreError};
use crate::traits::{InitResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<Option<Snapshot>>,
}

impl MemoryStore {
    /// Create a new, uninitialized in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn initialize(&self, owner: &Identity) -> Result<InitResult> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        match inner.as_ref() {
            Some(snapshot) if snapshot.owner == *owner => Ok(InitResult::AlreadyInitialized),
            Some(snapshot) => Err(StoreError::OwnerMismatch {
                stored: snapshot.owner,
                requested: *owner,
            }),
            None => {
                *inner = Some(Snapshot::new(*owner));
                Ok(InitResult::Initialized)
            }
        }
    }

    async fn owner(&self) -> Result<Option<Identity>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.as_ref().map(|s| s.owner))
    }

    async fn commit(&self, command: &Command) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let snapshot = inner.as_mut().ok_or(StoreError::Uninitialized)?;
        snapshot.apply(command);
        Ok(())
    }

    async fn load(&self) -> Result<Snapshot> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner.clone().ok_or(StoreError::Uninitialized)
    }
}
