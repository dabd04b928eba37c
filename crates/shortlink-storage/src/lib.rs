//! Key-value backends for the shortlink engine.

pub mod memory;
pub mod redis;

pub use crate::memory::InMemoryStore;
pub use crate::redis::{RedisStore, RedisStoreSettings};
pub use shortlink_core::{KvStore, StoreError};
