//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CacheStore trait.
//! Values are serialized as JSON; expiry is checked on read.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CacheStore, StorageError, StorageResult};
use crate::storage::{CacheValue, StoredEntry};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// SQLite cache backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the cache database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn get_entry(&self, key: &str) -> StorageResult<Option<StoredEntry>> {
        let conn = self.conn()?;
        let row: Option<(String, String, i64)> = conn
            .query_row(
                "SELECT value, created_at, ttl_ms FROM cache_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(|(value, created_at, ttl_ms)| decode_entry(&value, &created_at, ttl_ms))
            .transpose()
    }
}

fn decode_entry(value: &str, created_at: &str, ttl_ms: i64) -> StorageResult<StoredEntry> {
    let value: CacheValue = serde_json::from_str(value)?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| StorageError::Database(format!("Invalid created_at {:?}: {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(StoredEntry {
        value,
        created_at,
        ttl: Duration::from_millis(ttl_ms.max(0) as u64),
    })
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<CacheValue>> {
        Ok(self
            .get_entry(key)?
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    fn put(&self, key: &str, value: &CacheValue, ttl: Duration) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        self.conn()?.execute(
            "INSERT INTO cache_entries (key, kind, value, created_at, ttl_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET
                kind = excluded.kind,
                value = excluded.value,
                created_at = excluded.created_at,
                ttl_ms = excluded.ttl_ms",
            params![key, value.kind(), json, now, ttl_ms],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn()?
            .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn purge_expired(&self) -> StorageResult<usize> {
        let conn = self.conn()?;
        let now = Utc::now();

        let expired: Vec<String> = {
            let mut stmt = conn.prepare("SELECT key, created_at, ttl_ms FROM cache_entries")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;

            let mut keys = Vec::new();
            for row in rows {
                let (key, created_at, ttl_ms) = row?;
                let entry = StoredEntry {
                    value: CacheValue::Raw(Vec::new()),
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or(now),
                    ttl: Duration::from_millis(ttl_ms.max(0) as u64),
                };
                if entry.is_expired_at(now) {
                    keys.push(key);
                }
            }
            keys
        };

        for key in &expired {
            conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
        }

        Ok(expired.len())
    }

    fn len(&self) -> StorageResult<usize> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
