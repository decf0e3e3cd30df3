//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for recordgate. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use recordgate_core::record::{decode_allow_list, encode_allow_list};
use recordgate_core::{Command, Identity, Record, RecordKey, Role, Snapshot, Timestamp};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InitResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime. Every commit runs in its own
/// transaction.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening sqlite store");
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(format!("sqlite connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn identity_from_blob(bytes: &[u8]) -> Result<Identity> {
    Identity::try_from(bytes).map_err(|e| StoreError::InvalidData(format!("identity: {}", e)))
}

fn key_from_blob(bytes: &[u8]) -> Result<RecordKey> {
    RecordKey::try_from(bytes).map_err(|e| StoreError::InvalidData(format!("record key: {}", e)))
}

// Roles are u64; SQLite integers are i64, so they are kept as fixed-width blobs.
fn role_to_blob(role: Role) -> Vec<u8> {
    role.level().to_be_bytes().to_vec()
}

fn role_from_blob(bytes: &[u8]) -> Result<Role> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("role: expected 8 bytes, got {}", bytes.len())))?;
    Ok(Role::new(u64::from_be_bytes(arr)))
}

fn read_owner(conn: &Connection) -> Result<Option<Identity>> {
    let owner: Option<Vec<u8>> = conn
        .query_row("SELECT owner FROM store_owner WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    owner.map(|bytes| identity_from_blob(&bytes)).transpose()
}

fn apply_command(conn: &Connection, command: &Command) -> Result<usize> {
    let changed = match command {
        Command::AuthorizeUser { identity } => conn.execute(
            "INSERT OR IGNORE INTO authorized (identity) VALUES (?1)",
            params![identity.as_bytes().as_slice()],
        )?,
        Command::RemoveAuthorization { identity } => conn.execute(
            "DELETE FROM authorized WHERE identity = ?1",
            params![identity.as_bytes().as_slice()],
        )?,
        Command::SetUserRole { identity, role } if *role == Role::NONE => conn.execute(
            "DELETE FROM roles WHERE identity = ?1",
            params![identity.as_bytes().as_slice()],
        )?,
        Command::SetUserRole { identity, role } => conn.execute(
            "INSERT INTO roles (identity, role) VALUES (?1, ?2)
             ON CONFLICT(identity) DO UPDATE SET role = excluded.role",
            params![identity.as_bytes().as_slice(), role_to_blob(*role)],
        )?,
        Command::SetRecord { key, record } => conn.execute(
            "INSERT INTO records (record_key, data, expiration, min_role, allow_list, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(record_key) DO UPDATE SET
                data = excluded.data,
                expiration = excluded.expiration,
                min_role = excluded.min_role,
                allow_list = excluded.allow_list,
                updated_at = excluded.updated_at",
            params![
                key.as_bytes().as_slice(),
                &record.data[..],
                record.expiration.as_secs(),
                role_to_blob(record.min_role),
                encode_allow_list(&record.allow_list)?,
                Timestamp::now().as_secs(),
            ],
        )?,
        Command::DeleteRecord { key } => conn.execute(
            "DELETE FROM records WHERE record_key = ?1",
            params![key.as_bytes().as_slice()],
        )?,
    };

    Ok(changed)
}

fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    let owner = read_owner(conn)?.ok_or(StoreError::Uninitialized)?;
    let mut snapshot = Snapshot::new(owner);

    let mut stmt = conn.prepare("SELECT identity FROM authorized")?;
    let authorized = stmt
        .query_map([], |row| row.get::<_, Vec<u8>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for bytes in authorized {
        snapshot.authorized.insert(identity_from_blob(&bytes)?);
    }

    let mut stmt = conn.prepare("SELECT identity, role FROM roles")?;
    let roles = stmt
        .query_map([], |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (identity, role) in roles {
        snapshot
            .roles
            .insert(identity_from_blob(&identity)?, role_from_blob(&role)?);
    }

    let mut stmt = conn.prepare(
        "SELECT record_key, data, expiration, min_role, allow_list FROM records",
    )?;
    let records = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Vec<u8>>(3)?,
                row.get::<_, Vec<u8>>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (key, data, expiration, min_role, allow_list) in records {
        let record = Record {
            data: Bytes::from(data),
            expiration: Timestamp::from_secs(expiration),
            min_role: role_from_blob(&min_role)?,
            allow_list: decode_allow_list(&allow_list)?,
        };
        snapshot.records.insert(key_from_blob(&key)?, record);
    }

    Ok(snapshot)
}

#[async_trait]
impl Store for SqliteStore {
    async fn initialize(&self, owner: &Identity) -> Result<InitResult> {
        let owner = *owner;

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let result = match read_owner(&tx)? {
                Some(stored) if stored == owner => InitResult::AlreadyInitialized,
                Some(stored) => {
                    return Err(StoreError::OwnerMismatch {
                        stored,
                        requested: owner,
                    })
                }
                None => {
                    tx.execute(
                        "INSERT INTO store_owner (id, owner, created_at) VALUES (1, ?1, ?2)",
                        params![owner.as_bytes().as_slice(), Timestamp::now().as_secs()],
                    )?;
                    InitResult::Initialized
                }
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }

    async fn owner(&self) -> Result<Option<Identity>> {
        self.run(|conn| read_owner(conn)).await
    }

    async fn commit(&self, command: &Command) -> Result<()> {
        let command = command.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            if read_owner(&tx)?.is_none() {
                return Err(StoreError::Uninitialized);
            }

            let rows = apply_command(&tx, &command)?;
            tx.commit()?;

            debug!(op = command.name(), rows, "committed command");
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<Snapshot> {
        self.run(|conn| {
            let tx = conn.transaction()?;
            let snapshot = load_snapshot(&tx)?;
            tx.commit()?;
            Ok(snapshot)
        })
        .await
    }
}
