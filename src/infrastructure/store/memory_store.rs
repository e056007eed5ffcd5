//! In-process store implementation.

use crate::domain::store::{KeyValueStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// Expiry instant for `ttl` from `now`. A ttl past the clock's range never expires.
fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl)
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// A store kept in process memory.
///
/// Used when no Redis address is configured, and by tests. Semantics follow
/// the Redis backend: expired keys behave as missing, `decrement` on a
/// missing key yields `-1` without expiry, and non-integer values are
/// rejected by the counter operations.
///
/// Deadlines are measured on the tokio clock so paused-time tests can step
/// over a rate-limit window without sleeping.
///
/// Data does not survive a restart and is not shared between instances.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore (in-process, non-persistent)");
        Self::default()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawns a task that calls [`Self::purge_expired`] every `period`.
    ///
    /// Lazy expiry on access already hides stale entries; the sweeper only
    /// keeps memory bounded for keys nobody reads again.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged expired store entries");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_if_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
    }

    /// Returns the live entry for `key`, evicting it first if it has expired.
    fn live_entry<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a mut Entry> {
        Self::evict_if_expired(entries, key, now);
        entries.get_mut(key)
    }

    fn parse_counter(key: &str, value: &str) -> StoreResult<i64> {
        value.parse().map_err(|_| StoreError::InvalidValue {
            key: key.to_string(),
            reason: "value is not an integer".to_string(),
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key, now).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let now = Instant::now();
        self.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: deadline(now, ttl),
            },
        );
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.lock();
        if Self::live_entry(&mut entries, key, now).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: deadline(now, ttl),
            },
        );
        Ok(true)
    }

    async fn decrement(&self, key: &str) -> StoreResult<i64> {
        let now = Instant::now();
        let mut entries = self.lock();
        match Self::live_entry(&mut entries, key, now) {
            Some(entry) => {
                let next = Self::parse_counter(key, &entry.value)? - 1;
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "-1".to_string(),
                        expires_at: None,
                    },
                );
                Ok(-1)
            }
        }
    }

    async fn decrement_with_floor(
        &self,
        key: &str,
        initial: i64,
        ttl: Duration,
    ) -> StoreResult<Option<i64>> {
        let now = Instant::now();
        let mut entries = self.lock();
        Self::evict_if_expired(&mut entries, key, now);
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: initial.to_string(),
            expires_at: deadline(now, ttl),
        });

        let current = Self::parse_counter(key, &entry.value)?;
        if current <= 0 {
            return Ok(None);
        }
        entry.value = (current - 1).to_string();
        Ok(Some(current - 1))
    }

    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>> {
        let now = Instant::now();
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key, now)
            .and_then(|e| e.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now)))
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn close(&self) -> StoreResult<()> {
        let mut entries = self.lock();
        info!(entries = entries.len(), "Closing MemoryStore");
        entries.clear();
        Ok(())
    }
}
