//! Core types and traits for the shortlink service.
//!
//! This crate holds the id encoder, the URL fingerprinter, the key layout of
//! the shared key-value namespace and the [`KvStore`] capability trait that
//! storage backends implement.

pub mod base62;
pub mod clock;
pub mod detail;
pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use detail::ShortlinkDetail;
pub use error::{CoreError, DecodeError, StoreError};
pub use fingerprint::{fingerprint, Fingerprint};
pub use shortcode::ShortCode;
pub use store::KvStore;
