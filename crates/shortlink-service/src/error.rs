use shortlink_core::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortlinkError>;

#[derive(Debug, Clone, Error)]
pub enum ShortlinkError {
    /// The id has no active mapping.
    #[error("unknown shortlink: {0}")]
    NotFound(String),
    /// The key-value backend failed; passed through unchanged.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[from] StoreError),
    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
}
