//! In-memory storage implementation

use crate::storage::traits::{CacheStore, StorageError, StorageResult};
use crate::storage::{CacheValue, StoredEntry};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Process-local cache store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<CacheValue>> {
        {
            let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Re-checked under the write lock: a writer may have refreshed it
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        if entries.get(key).is_some_and(StoredEntry::is_expired) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn put(&self, key: &str, value: &CacheValue, ttl: Duration) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), StoredEntry::new(value.clone(), ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn purge_expired(&self) -> StorageResult<usize> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        Ok(before - entries.len())
    }

    fn len(&self) -> StorageResult<usize> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.len())
    }
}
