//! Error types for interaction recording and preview resolution.

use bm_store::StoreError;

/// Error from the interaction layer.
#[derive(Debug, thiserror::Error)]
pub enum InteractError {
    /// Request input is missing or malformed.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending input.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Token or referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Preview token is past its expiry.
    #[error("preview token expired")]
    Expired,

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
