use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Metadata stored next to every shortlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlinkDetail {
    /// The original URL that was shortened.
    pub url: String,
    /// When the shortlink was created.
    pub created_at: Timestamp,
    /// Requested lifetime; `0` means the shortlink never expires.
    pub expiration_in_minutes: u64,
}
