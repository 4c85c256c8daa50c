//! HTTP request handlers.

pub(crate) mod delivery;
pub(crate) mod export;
pub(crate) mod preview;
pub(crate) mod responses;

/// Handle GET /health.
pub(crate) async fn health() -> &'static str {
    "ok"
}
