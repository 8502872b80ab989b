//! Storage traits and error types
//!
//! This module defines the trait interface for cache storage backends and
//! associated error types.

use crate::storage::CacheValue;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for cache storage backends
///
/// Implementations must be safe to share between tasks; every method takes
/// `&self` and handles its own locking.
pub trait CacheStore: Send + Sync {
    /// Gets the value stored under `key`
    ///
    /// Returns `None` when the key is absent or its time-to-live has elapsed.
    fn get(&self, key: &str) -> StorageResult<Option<CacheValue>>;

    /// Stores `value` under `key`, replacing any previous entry
    fn put(&self, key: &str, value: &CacheValue, ttl: Duration) -> StorageResult<()>;

    /// Removes the entry under `key`, if any
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Drops every expired entry and returns how many were removed
    fn purge_expired(&self) -> StorageResult<usize>;

    /// Number of stored entries, expired ones included
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
