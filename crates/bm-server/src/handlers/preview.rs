//! Preview and email snapshot endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use bm_blocks::Document;
use bm_interact::{create_preview, resolve_preview, ttl_hours};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /api/preview.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePreviewRequest {
    email_id: String,
    #[serde(default)]
    ttl_hours: Option<u32>,
}

/// Response for POST /api/preview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePreviewResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Handle GET /api/preview/{token}.
pub(crate) async fn get_preview(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let snapshot = resolve_preview(state.previews.as_ref(), &token, Utc::now()).await?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(snapshot)))
}

/// Handle POST /api/preview.
pub(crate) async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePreviewRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let ttl = ttl_hours(request.ttl_hours.unwrap_or(state.preview_ttl_hours));
    let token = create_preview(state.previews.as_ref(), &request.email_id, ttl, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePreviewResponse {
            token: token.token,
            expires_at: token.expires_at,
        }),
    ))
}

/// Handle PUT /api/emails/{email_id}.
///
/// Stores the snapshot that preview tokens resolve to. A body without an id
/// takes the id from the path.
pub(crate) async fn save_email(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
    Json(mut document): Json<Document>,
) -> Result<StatusCode, ServerError> {
    if document.id.is_empty() {
        document.id.clone_from(&email_id);
    } else if document.id != email_id {
        return Err(ServerError::BadRequest(
            "document id does not match path".to_owned(),
        ));
    }

    state.previews.save_email(&document).await?;
    tracing::debug!(email = %email_id, blocks = document.blocks.len(), "Saved email snapshot");
    Ok(StatusCode::NO_CONTENT)
}
