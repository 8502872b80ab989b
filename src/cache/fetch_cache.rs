//! Single-flight fetch-and-parse cache
//!
//! # Request Flow
//!
//! 1. Fresh entry in the store → return it, no network
//! 2. Another task is already fetching the key → wait for its outcome
//! 3. Otherwise become the leader: fetch, parse, store, then publish the
//!    outcome to every waiting task
//!
//! | Outcome | Stored | Waiting tasks receive |
//! |---------|--------|-----------------------|
//! | success | yes, with the configured TTL | the parsed value |
//! | fetch or parse failure | no | the same error |
//! | leader dropped mid-fetch | no | nothing; one of them takes over |

use crate::cache::CacheKey;
use crate::model::{LeafDocument, ListingPage};
use crate::storage::{CacheStore, CacheValue, MemoryStore};
use crate::{ArchiveError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Default time-to-live for cached results (one hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Values that can be held by the cache
pub trait Cacheable: Clone + Send + Sync + 'static {
    fn into_value(self) -> CacheValue;
    fn from_value(value: CacheValue) -> Option<Self>;
}

impl Cacheable for ListingPage {
    fn into_value(self) -> CacheValue {
        CacheValue::Listing(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

impl Cacheable for LeafDocument {
    fn into_value(self) -> CacheValue {
        CacheValue::Leaf(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Leaf(doc) => Some(doc),
            _ => None,
        }
    }
}

impl Cacheable for Vec<u8> {
    fn into_value(self) -> CacheValue {
        CacheValue::Raw(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Observable state of a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// A fetch for the key is in flight
    Pending,

    /// A fresh value is stored
    Ready,
}

/// Progress of one in-flight fetch, as seen by waiting tasks
#[derive(Debug, Clone)]
enum Flight {
    Pending,
    Ready(CacheValue),
    Failed(ArchiveError),
}

enum Claim<T> {
    Hit(T),
    Follower(watch::Receiver<Flight>),
    Leader(watch::Sender<Flight>),
}

type InFlight = Mutex<HashMap<String, watch::Receiver<Flight>>>;

/// Removes the in-flight marker when the leader finishes or is dropped
struct FlightGuard<'a> {
    in_flight: &'a InFlight,
    key: &'a str,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(self.key);
        }
    }
}

/// Memoizes fetch-and-parse results per key with single-flight semantics
pub struct FetchCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    in_flight: InFlight,
}

impl FetchCache {
    /// Creates a cache over `store` with the given time-to-live
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a cache backed by a fresh [`MemoryStore`]
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryStore::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Returns the cached value for `key`, fetching and parsing it if needed
    ///
    /// # Arguments
    ///
    /// * `key` - Deterministic key covering every parameter of the request
    /// * `fetch` - Produces the raw response bytes; only called by the leader
    /// * `parse` - Turns the raw bytes into the cached value
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The cached or freshly parsed value
    /// * `Err(ArchiveError)` - The fetch or parse failed; nothing was stored
    pub async fn fetch_and_parse<T, F, Fut, P>(&self, key: &CacheKey, fetch: F, parse: P) -> Result<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
        P: FnOnce(&[u8]) -> Result<T>,
    {
        let key = key.to_string();

        if let Some(value) = self.lookup::<T>(&key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(value);
        }

        let tx = loop {
            match self.claim::<T>(&key)? {
                Claim::Hit(value) => return Ok(value),
                Claim::Leader(tx) => break tx,
                Claim::Follower(rx) => match wait_for_outcome(rx).await {
                    Some(Flight::Ready(value)) => return decode(&key, value),
                    Some(Flight::Failed(err)) => return Err(err),
                    _ => {
                        tracing::debug!("Fetch for {} was abandoned, taking over", key);
                    }
                },
            }
        };

        let _guard = FlightGuard {
            in_flight: &self.in_flight,
            key: &key,
        };

        let outcome = self.run(&key, fetch, parse).await;

        tx.send_replace(match &outcome {
            Ok(value) => Flight::Ready(value.clone().into_value()),
            Err(err) => Flight::Failed(err.clone()),
        });

        outcome
    }

    /// Reports whether `key` is being fetched or is stored
    pub fn entry_state(&self, key: &CacheKey) -> Result<Option<EntryState>> {
        let key = key.to_string();
        {
            let in_flight = self.lock_in_flight()?;
            if in_flight.contains_key(&key) {
                return Ok(Some(EntryState::Pending));
            }
        }

        Ok(self.store.get(&key)?.map(|_| EntryState::Ready))
    }

    /// Drops the stored value for `key`
    pub fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.store.remove(&key.to_string())?;
        Ok(())
    }

    async fn run<T, F, Fut, P>(&self, key: &str, fetch: F, parse: P) -> Result<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
        P: FnOnce(&[u8]) -> Result<T>,
    {
        tracing::debug!("Cache miss: {}", key);

        let bytes = fetch().await?;
        let parsed = parse(&bytes)?;

        if let Err(e) = self.store.put(key, &parsed.clone().into_value(), self.ttl) {
            tracing::warn!("Failed to store cache entry {}: {}", key, e);
        }

        Ok(parsed)
    }

    /// Reads a stored value; an unreadable or mismatched entry counts as a miss
    fn lookup<T: Cacheable>(&self, key: &str) -> Option<T> {
        let stored = self
            .store
            .get(key)
            .map_err(ArchiveError::from)
            .and_then(|value| value.map(|value| decode(key, value)).transpose());

        match stored {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                if let Err(e) = self.store.remove(key) {
                    tracing::warn!("Failed to remove cache entry {}: {}", key, e);
                }
                None
            }
        }
    }

    /// Decides, under the in-flight lock, whether this caller leads or waits
    fn claim<T: Cacheable>(&self, key: &str) -> Result<Claim<T>> {
        let mut in_flight = self.lock_in_flight()?;

        if let Some(rx) = in_flight.get(key) {
            return Ok(Claim::Follower(rx.clone()));
        }

        // A leader may have stored its result since the unlocked lookup
        if let Some(value) = self.lookup::<T>(key) {
            return Ok(Claim::Hit(value));
        }

        let (tx, rx) = watch::channel(Flight::Pending);
        in_flight.insert(key.to_string(), rx);
        Ok(Claim::Leader(tx))
    }

    fn lock_in_flight(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, watch::Receiver<Flight>>>> {
        self.in_flight
            .lock()
            .map_err(|_| ArchiveError::Storage("in-flight table lock poisoned".to_string()))
    }
}

async fn wait_for_outcome(mut rx: watch::Receiver<Flight>) -> Option<Flight> {
    match rx.wait_for(|flight| !matches!(flight, Flight::Pending)).await {
        Ok(flight) => Some(flight.clone()),
        Err(_) => None,
    }
}

fn decode<T: Cacheable>(key: &str, value: CacheValue) -> Result<T> {
    let kind = value.kind();
    T::from_value(value).ok_or_else(|| {
        ArchiveError::Storage(format!("Cached value under {} has unexpected kind {}", key, kind))
    })
}
