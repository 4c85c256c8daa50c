//! Error types for email delivery.

/// Error from a delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Message is missing a required field.
    #[error("invalid message: {0}")]
    Validation(&'static str),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// Provider returned an error status.
    #[error("provider error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (usually the provider's message).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl DeliveryError {
    /// Whether the failure came from the provider or the network rather than
    /// the caller's input.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}
