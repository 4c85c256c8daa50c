//! Render and export endpoints.
//!
//! `/api/render` produces markup for the editor's live preview.
//! `/api/export` produces the final sendable email: rendered in email mode,
//! CSS inlined and measured against the clipping threshold.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use bm_blocks::{Document, RenderMode, render};
use bm_inline::{InlinedEmail, inline_with_budget};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /api/export.
///
/// Exactly one of `html` and `document` must be present.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ExportRequest {
    /// Already rendered markup to inline.
    html: Option<String>,
    /// Document to render in email mode first.
    document: Option<Document>,
    /// Recipient token for response links.
    export_token: Option<String>,
}

/// Request body for POST /api/render.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenderRequest {
    document: Document,
    #[serde(default)]
    mode: RenderMode,
    #[serde(default)]
    export_token: Option<String>,
}

/// Response for POST /api/render.
#[derive(Debug, Serialize)]
pub(crate) struct RenderResponse {
    html: String,
}

/// Handle POST /api/render.
pub(crate) async fn render_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Json<RenderResponse> {
    let context = state.render_context(request.export_token);
    Json(RenderResponse {
        html: render(&request.document, request.mode, &context),
    })
}

/// Handle POST /api/export.
pub(crate) async fn export(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<InlinedEmail>, ServerError> {
    let markup = match (request.html, request.document) {
        (Some(html), None) => html,
        (None, Some(document)) => {
            let duplicates = document.duplicate_block_ids();
            if !duplicates.is_empty() {
                return Err(ServerError::BadRequest(format!(
                    "duplicate block ids: {}",
                    duplicates.join(", ")
                )));
            }
            let context = state.render_context(request.export_token);
            render(&document, RenderMode::Email, &context)
        }
        (Some(_), Some(_)) => {
            return Err(ServerError::BadRequest(
                "provide either html or document, not both".to_owned(),
            ));
        }
        (None, None) => {
            return Err(ServerError::BadRequest(
                "html or document is required".to_owned(),
            ));
        }
    };

    let report = inline_with_budget(&markup, state.budget);
    if report.clipped {
        tracing::warn!(
            size_kb = report.size_kb,
            threshold_kb = state.budget.threshold_kb,
            "Export exceeds clipping threshold"
        );
    }
    Ok(Json(report))
}
