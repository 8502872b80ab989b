//! Storage backends for the fetch cache
//!
//! This module holds the cache's backing stores:
//! - An in-memory map for single-process use
//! - A SQLite database for caches that outlive the process
//!
//! Both implement [`CacheStore`], so the fetch cache never depends on a
//! concrete backend.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CacheStore, StorageError, StorageResult};

use crate::model::{LeafDocument, ListingPage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A value held by the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CacheValue {
    Listing(ListingPage),
    Leaf(LeafDocument),
    Raw(Vec<u8>),
}

impl CacheValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Listing(_) => "listing",
            Self::Leaf(_) => "leaf",
            Self::Raw(_) => "raw",
        }
    }
}

/// A stored value together with its creation time and time-to-live
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub value: CacheValue,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl StoredEntry {
    pub fn new(value: CacheValue, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Checks whether the time-to-live has elapsed at `now`
    ///
    /// An entry created in the future (clock skew) is never expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match (now - self.created_at).to_std() {
            Ok(age) => age >= self.ttl,
            Err(_) => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_not_expired_when_fresh() {
        let entry = StoredEntry::new(CacheValue::Raw(vec![1]), Duration::from_secs(3600));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expired_after_ttl() {
        let mut entry = StoredEntry::new(CacheValue::Raw(vec![1]), Duration::from_secs(3600));
        entry.created_at = Utc::now() - chrono::Duration::hours(2);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_always_expired() {
        let entry = StoredEntry::new(CacheValue::Raw(vec![]), Duration::ZERO);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_future_entry_not_expired() {
        let mut entry = StoredEntry::new(CacheValue::Raw(vec![]), Duration::from_secs(1));
        entry.created_at = Utc::now() + chrono::Duration::hours(1);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_value_kind_names() {
        assert_eq!(CacheValue::Raw(vec![]).kind(), "raw");
        assert_eq!(CacheValue::Listing(ListingPage::default()).kind(), "listing");
    }
}
