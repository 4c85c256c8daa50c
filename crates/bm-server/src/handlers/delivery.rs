//! Test-send endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use bm_delivery::{DeliveryReceipt, OutgoingEmail};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle POST /api/test-send.
///
/// The provider client blocks, so the send runs on tokio's blocking pool.
pub(crate) async fn test_send(
    State(state): State<Arc<AppState>>,
    Json(email): Json<OutgoingEmail>,
) -> Result<Json<DeliveryReceipt>, ServerError> {
    let mailer = state
        .mailer
        .clone()
        .ok_or(ServerError::DeliveryNotConfigured)?;
    email.validate()?;

    let receipt = tokio::task::spawn_blocking(move || mailer.send(&email))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(Json(receipt))
}
