//! Response link and results endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use bm_interact::{InteractError, confirmation_page, record_response, tally};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /r/{token}/{block_id}/{value}.
///
/// Every outcome that is not a storage failure yields the same page, so a
/// recipient cannot tell a first click from a repeat.
pub(crate) async fn follow_link(
    State(state): State<Arc<AppState>>,
    Path((token, block_id, value)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ServerError> {
    match record_response(state.responses.as_ref(), &token, &block_id, &value).await {
        Ok(_) => {}
        Err(InteractError::Validation { field, reason }) => {
            tracing::debug!(field, reason, "Ignoring malformed response link");
        }
        Err(err) => return Err(err.into()),
    }

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Html(confirmation_page()),
    ))
}

/// Response for GET /api/blocks/{block_id}/results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultsResponse {
    block_id: String,
    total: u64,
    counts: BTreeMap<String, u64>,
}

/// Handle GET /api/blocks/{block_id}/results.
pub(crate) async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(block_id): Path<String>,
) -> Result<Json<ResultsResponse>, ServerError> {
    let counts = tally(state.responses.as_ref(), &block_id).await?;
    Ok(Json(ResultsResponse {
        total: counts.values().sum(),
        block_id,
        counts,
    }))
}
