use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use shortlink_core::error::{Result, StoreError};
use shortlink_core::{Clock, KvStore, SystemClock};
use std::time::Duration;
use tracing::trace;

/// In-memory storage entry with an optional deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
}

impl Entry {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }
}

/// In-memory implementation of [`KvStore`] using DashMap.
///
/// Expired entries are evicted lazily when they are read. Increments run
/// under the shard lock of the counter key, so they are atomic within one
/// process. Running several processes against separate `InMemoryStore`s
/// gives each its own counter.
#[derive(Debug)]
pub struct InMemoryStore<C: Clock = SystemClock> {
    storage: DashMap<String, Entry>,
    clock: C,
}

impl InMemoryStore<SystemClock> {
    /// Creates a new in-memory store backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryStore<C> {
    /// Creates a new in-memory store that reads time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }

    fn deadline(&self, ttl: Option<Duration>) -> Result<Option<Timestamp>> {
        let Some(ttl) = ttl else {
            return Ok(None);
        };
        let ttl = SignedDuration::try_from(ttl)
            .map_err(|e| StoreError::InvalidData(format!("invalid ttl {ttl:?}: {e}")))?;
        self.clock
            .now()
            .checked_add(ttl)
            .map(Some)
            .map_err(|e| StoreError::InvalidData(format!("ttl out of range: {e}")))
    }
}

#[async_trait]
impl<C: Clock> KvStore for InMemoryStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "reading key from memory");

        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now()) {
            drop(entry);
            // re-check under the write lock, a fresh value may have landed meanwhile
            let now = self.clock.now();
            self.storage.remove_if(key, |_, e| e.is_expired(now));
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        trace!(key, ?ttl, "writing key to memory");

        let expire_at = self.deadline(ttl)?;
        self.storage.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expire_at,
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64> {
        let now = self.clock.now();

        match self.storage.entry(key.to_owned()) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let current = if entry.is_expired(now) {
                    entry.expire_at = None;
                    0
                } else {
                    entry.value.parse::<u64>().map_err(|e| {
                        StoreError::InvalidData(format!(
                            "value at '{key}' is not an integer: {e}"
                        ))
                    })?
                };
                let next = current.checked_add(1).ok_or_else(|| {
                    StoreError::Operation(format!("increment of '{key}' would overflow"))
                })?;
                entry.value = next.to_string();
                Ok(next)
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry {
                    value: "1".to_string(),
                    expire_at: None,
                });
                Ok(1)
            }
        }
    }
}
