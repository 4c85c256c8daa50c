//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use bm_blocks::RenderContext;
use bm_delivery::Mailer;
use bm_inline::SizeBudget;
use bm_store::{PreviewStore, ResponseStore};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Response storage for interaction links.
    pub(crate) responses: Arc<dyn ResponseStore>,
    /// Preview token and email snapshot storage.
    pub(crate) previews: Arc<dyn PreviewStore>,
    /// Mail provider (if configured).
    pub(crate) mailer: Option<Arc<dyn Mailer>>,
    /// Public base URL for response links.
    pub(crate) api_base: String,
    /// Clipping threshold for exports.
    pub(crate) budget: SizeBudget,
    /// Default preview token lifetime.
    pub(crate) preview_ttl_hours: u32,
}

impl AppState {
    /// Render context for an optional export token.
    pub(crate) fn render_context(&self, export_token: Option<String>) -> RenderContext {
        let context = RenderContext::new(self.api_base.clone());
        match export_token {
            Some(token) => context.with_export_token(token),
            None => context,
        }
    }
}
