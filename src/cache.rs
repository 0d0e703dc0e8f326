use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::utils::{Clock, SystemClock};

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Keyed cache whose entries expire a fixed time after they were stored.
///
/// Reads and writes go through one mutex. An expired entry is dropped on the next
/// read of its key and reported as absent. Storing a value also drops every other
/// expired entry, so keys that are no longer read do not pile up.
pub struct TtlCache<V> {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: TimeDelta) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        Self::fresh_value(&mut self.lock(), key, now)
    }

    pub fn insert(&self, key: &str, value: V) {
        let now = self.clock.now();
        let mut entries = self.lock();
        Self::prune_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Return the fresh value for `key`, or run `load` and store what it returns.
    ///
    /// The lock is held while `load` runs, so concurrent callers for a missing key
    /// trigger a single load. Errors are returned as-is and never stored.
    pub fn get_or_try_insert_with<E, F>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut entries = self.lock();
        if let Some(value) = Self::fresh_value(&mut entries, key, self.clock.now()) {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, "Cache miss");
        let value = load()?;
        let now = self.clock.now();
        Self::prune_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(value)
    }

    fn prune_expired(entries: &mut HashMap<String, CacheEntry<V>>, now: DateTime<Utc>) {
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired cache entries");
        }
    }

    fn fresh_value(
        entries: &mut HashMap<String, CacheEntry<V>>,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<V> {
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // A panic inside `load` leaves the map untouched, so the data is still sound
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
