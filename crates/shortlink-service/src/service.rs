use crate::error::{Result, ShortlinkError};
use async_trait::async_trait;
use shortlink_core::keys::{self, COUNTER_KEY, EXPIRED_SENTINEL};
use shortlink_core::{
    fingerprint, Clock, Fingerprint, KvStore, ShortCode, ShortlinkDetail, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Shorten / resolve operations exposed to adapters.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the id for `url`, reusing a live one when the URL was seen before.
    ///
    /// `expiration_in_minutes == 0` stores the records without expiry.
    async fn shorten(&self, url: &str, expiration_in_minutes: u64) -> Result<ShortCode>;

    /// Resolves an id to its original URL.
    ///
    /// An id that could never have been issued is reported as
    /// [`ShortlinkError::NotFound`], like any other unknown id.
    async fn unshorten(&self, shortlink: &str) -> Result<String>;

    /// Returns the detail record of an id.
    async fn shortlink_info(&self, shortlink: &str) -> Result<ShortlinkDetail>;
}

/// The shortlink mapping engine.
///
/// Each shortlink owns three records in the store, all written with the same
/// TTL: the forward mapping (`id -> url`), the hash index
/// (`fingerprint(url) -> id`) and the detail record. Ids come from the
/// store's atomic counter, which is the only point of serialization; there is
/// no in-process locking.
///
/// The records are written one by one without a transaction. A failure half
/// way leaves whatever was already written in place. The hash index is written
/// last and an index entry is only honoured while its forward mapping is still
/// readable, so a partial write never produces a dedup hit on a dead id.
///
/// Dedup is best effort: two concurrent calls for the same unseen URL can both
/// miss the index and allocate two ids for it.
#[derive(Debug)]
pub struct ShortlinkService<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
}

impl<S, C: Clone> Clone for ShortlinkService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: self.clock.clone(),
        }
    }
}

impl<S: KvStore> ShortlinkService<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KvStore, C: Clock> ShortlinkService<S, C> {
    /// Creates a service that stamps detail records with `clock`.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store: Arc::new(store),
            clock,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up a live shortlink for `url` through the hash index.
    async fn find_existing(&self, url: &str, fp: &Fingerprint) -> Result<Option<ShortCode>> {
        let index_key = keys::hash_index_key(fp);
        trace!(key = %index_key, "looking up hash index");

        let Some(raw) = self.store.get(&index_key).await? else {
            return Ok(None);
        };

        if raw.is_empty() || raw == EXPIRED_SENTINEL {
            debug!(key = %index_key, "hash index entry marked as expired");
            return Ok(None);
        }

        let code = match ShortCode::new(raw) {
            Ok(code) => code,
            Err(e) => {
                warn!(key = %index_key, error = %e, "ignoring malformed hash index entry");
                return Ok(None);
            }
        };

        match self.store.get(&keys::forward_key(&code)).await? {
            Some(stored) if stored == url => Ok(Some(code)),
            Some(_) => {
                warn!(code = %code, "hash index points at a different url");
                Ok(None)
            }
            None => {
                debug!(code = %code, "hash index outlived its forward mapping");
                Ok(None)
            }
        }
    }

    async fn allocate(&self) -> Result<ShortCode> {
        let value = self.store.incr(COUNTER_KEY).await?;
        Ok(ShortCode::from_counter(value))
    }
}

fn lookup_code(shortlink: &str) -> Result<ShortCode> {
    ShortCode::new(shortlink).map_err(|e| {
        debug!(shortlink, error = %e, "id cannot name a shortlink");
        ShortlinkError::NotFound(shortlink.to_owned())
    })
}

fn ttl_from_minutes(minutes: u64) -> Result<Option<Duration>> {
    if minutes == 0 {
        return Ok(None);
    }
    minutes
        .checked_mul(60)
        .map(|secs| Some(Duration::from_secs(secs)))
        .ok_or_else(|| {
            ShortlinkError::InvalidExpiration(format!("{minutes} minutes is out of range"))
        })
}

#[async_trait]
impl<S: KvStore, C: Clock> Shortener for ShortlinkService<S, C> {
    async fn shorten(&self, url: &str, expiration_in_minutes: u64) -> Result<ShortCode> {
        let ttl = ttl_from_minutes(expiration_in_minutes)?;
        let fp = fingerprint(url);

        if let Some(code) = self.find_existing(url, &fp).await? {
            debug!(code = %code, "dedup hit");
            return Ok(code);
        }

        let code = self.allocate().await?;

        let detail = ShortlinkDetail {
            url: url.to_owned(),
            created_at: self.clock.now(),
            expiration_in_minutes,
        };
        let detail_json = serde_json::to_string(&detail)
            .map_err(|e| ShortlinkError::Corrupt(format!("failed to encode detail: {e}")))?;

        self.store.set(&keys::forward_key(&code), url, ttl).await?;
        self.store
            .set(&keys::detail_key(&code), &detail_json, ttl)
            .await?;
        self.store
            .set(&keys::hash_index_key(&fp), code.as_str(), ttl)
            .await?;

        info!(code = %code, expiration_in_minutes, "created shortlink");
        Ok(code)
    }

    async fn unshorten(&self, shortlink: &str) -> Result<String> {
        let code = lookup_code(shortlink)?;
        self.store
            .get(&keys::forward_key(&code))
            .await?
            .ok_or_else(|| ShortlinkError::NotFound(code.to_string()))
    }

    async fn shortlink_info(&self, shortlink: &str) -> Result<ShortlinkDetail> {
        let code = lookup_code(shortlink)?;
        let raw = self
            .store
            .get(&keys::detail_key(&code))
            .await?
            .ok_or_else(|| ShortlinkError::NotFound(code.to_string()))?;

        serde_json::from_str(&raw).map_err(|e| {
            warn!(code = %code, error = %e, "failed to decode detail record");
            ShortlinkError::Corrupt(format!("detail record of '{code}': {e}"))
        })
    }
}
