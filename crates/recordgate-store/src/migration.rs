//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;
use tracing::debug;

use recordgate_core::Timestamp;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            debug!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, Timestamp::now().as_secs()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Single-row table holding the store owner
        CREATE TABLE store_owner (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            owner BLOB NOT NULL,              -- 32 bytes, owner identity
            created_at INTEGER NOT NULL       -- Unix seconds
        );

        -- Baseline authorization set
        CREATE TABLE authorized (
            identity BLOB PRIMARY KEY         -- 32 bytes
        );

        -- Explicit role assignments; absent rows mean role 0
        CREATE TABLE roles (
            identity BLOB PRIMARY KEY,        -- 32 bytes
            role BLOB NOT NULL                -- u64, 8 bytes big-endian
        );

        -- Live records; a deleted record has no row
        CREATE TABLE records (
            record_key BLOB PRIMARY KEY,      -- 32 bytes
            data BLOB NOT NULL,               -- opaque payload
            expiration INTEGER NOT NULL,      -- Unix seconds
            min_role BLOB NOT NULL,           -- u64, 8 bytes big-endian
            allow_list BLOB NOT NULL,         -- CBOR array of identities
            updated_at INTEGER NOT NULL       -- local commit time, Unix seconds
        );
        "#,
    )?;

    Ok(())
}
