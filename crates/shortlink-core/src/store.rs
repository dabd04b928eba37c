use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The key-value capability the shortlink engine needs from a backend.
///
/// Every operation may fail with a [`StoreError`](crate::error::StoreError);
/// implementations surface backend failures as-is and never retry.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Returns the value stored at `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or has expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` at `key`, replacing any previous value.
    ///
    /// With `ttl` set the entry stops being readable once it elapses;
    /// `None` keeps the entry until it is overwritten.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Atomically increments the integer at `key` and returns the new value.
    ///
    /// A missing key counts as `0`, so the first call returns `1`.
    async fn incr(&self, key: &str) -> Result<u64>;
}
