//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/api/render", post(handlers::export::render_document))
        .route("/api/export", post(handlers::export::export))
        .route("/api/test-send", post(handlers::delivery::test_send))
        .route("/api/emails/{email_id}", put(handlers::preview::save_email))
        .route("/api/preview", post(handlers::preview::create))
        .route("/api/preview/{token}", get(handlers::preview::get_preview))
        .route(
            "/api/blocks/{block_id}/results",
            get(handlers::responses::get_results),
        );

    // Links followed from sent emails
    let link_routes = Router::new().route(
        "/r/{token}/{block_id}/{value}",
        get(handlers::responses::follow_link),
    );

    Router::new()
        .merge(api_routes)
        .merge(link_routes)
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}
