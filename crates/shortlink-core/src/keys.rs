//! Key layout of the shared key-value namespace.

use crate::fingerprint::Fingerprint;
use crate::shortcode::ShortCode;

/// Singleton key of the global id counter.
pub const COUNTER_KEY: &str = "next.url.id";

/// Value written in place of an id to mark a hash index entry as expired.
pub const EXPIRED_SENTINEL: &str = "{}";

/// `shortlink:<id>:url`
pub fn forward_key(code: &ShortCode) -> String {
    format!("shortlink:{}:url", code.as_str())
}

/// `urlhash:<fingerprint>:shortlink`
pub fn hash_index_key(fingerprint: &Fingerprint) -> String {
    format!("urlhash:{}:shortlink", fingerprint.as_str())
}

/// `shortlink:<id>:detail`
pub fn detail_key(code: &ShortCode) -> String {
    format!("shortlink:{}:detail", code.as_str())
}
