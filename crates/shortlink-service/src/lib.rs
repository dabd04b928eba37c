//! Shortlink mapping engine.
//!
//! [`ShortlinkService`] turns URLs into base-62 ids backed by any
//! [`KvStore`](shortlink_core::KvStore), deduplicating by URL fingerprint and
//! resolving ids back while their records are alive.

pub mod error;
pub mod service;

pub use error::{Result, ShortlinkError};
pub use service::{Shortener, ShortlinkService};
