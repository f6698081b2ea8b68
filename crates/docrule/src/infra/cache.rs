//! Query result cache keyed by serialized query keys.
//!
//! The cache is an explicit value owned by whoever issues the queries; there is no process-wide
//! instance.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;

/// Source of the current time for staleness checks.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

/// Time-bounded cache from query keys to values.
#[derive(Debug)]
pub struct QueryCache<V, C = SystemClock> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
    clock: C,
}

impl<V: Clone> QueryCache<V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V: Clone, C: Clock> QueryCache<V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Serialize a query key into its cache representation.
    pub fn key_for<K: Serialize + ?Sized>(key: &K) -> Result<String> {
        serde_json::to_string(key).context("failed to serialize cache key")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns whether `entry` has outlived the cache TTL.
    pub fn is_stale(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now().saturating_duration_since(entry.stored_at) >= self.ttl
    }

    /// Fetch a fresh value. Stale entries are treated as missing.
    pub fn get<K: Serialize + ?Sized>(&self, key: &K) -> Result<Option<V>> {
        let key = Self::key_for(key)?;
        Ok(self
            .entries
            .get(&key)
            .filter(|entry| !self.is_stale(entry))
            .map(|entry| entry.value.clone()))
    }

    pub fn insert<K: Serialize + ?Sized>(&mut self, key: &K, value: V) -> Result<()> {
        let key = Self::key_for(key)?;
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Drop a cached value. Returns `true` when an entry was removed.
    pub fn invalidate<K: Serialize + ?Sized>(&mut self, key: &K) -> Result<bool> {
        let key = Self::key_for(key)?;
        Ok(self.entries.remove(&key).is_some())
    }

    /// Remove every stale entry, returning how many were dropped.
    pub fn purge_stale(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) < ttl);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    struct ManualClock {
        now: Cell<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }

    #[test]
    fn fresh_entries_are_returned() -> Result<()> {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(&("rules", 7), "pattern".to_string())?;
        assert_eq!(cache.get(&("rules", 7))?, Some("pattern".to_string()));
        assert_eq!(cache.get(&("rules", 8))?, None);
        Ok(())
    }

    #[test]
    fn stale_entries_expire() -> Result<()> {
        let clock = ManualClock::new();
        let mut cache = QueryCache::with_clock(Duration::from_secs(10), &clock);
        cache.insert("templates", vec![1, 2, 3])?;

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get("templates")?, Some(vec![1, 2, 3]));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("templates")?, None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_stale(), 1);
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn structured_keys_are_distinguished() -> Result<()> {
        #[derive(Serialize)]
        struct Key<'a> {
            label: &'a str,
            values: &'a [&'a str],
        }

        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(&Key { label: "cnpj", values: &["a"] }, 1)?;
        cache.insert(&Key { label: "cnpj", values: &["a", "b"] }, 2)?;

        assert_eq!(cache.len(), 2);
        assert!(cache.invalidate(&Key { label: "cnpj", values: &["a"] })?);
        assert!(!cache.invalidate(&Key { label: "cnpj", values: &["a"] })?);
        assert_eq!(cache.get(&Key { label: "cnpj", values: &["a", "b"] })?, Some(2));
        Ok(())
    }
}
