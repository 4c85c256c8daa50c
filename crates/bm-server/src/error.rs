//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bm_delivery::DeliveryError;
use bm_interact::InteractError;
use bm_store::StoreError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Request body is incomplete or contradictory.
    #[error("{0}")]
    BadRequest(String),

    /// Token or record not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Preview token past its expiry.
    #[error("Preview token expired")]
    Expired,

    /// No mail provider configured.
    #[error("Test sends are not configured")]
    DeliveryNotConfigured,

    /// Mail provider or input failure.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Background task failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InteractError> for ServerError {
    fn from(err: InteractError) -> Self {
        match err {
            InteractError::Validation { .. } => Self::BadRequest(err.to_string()),
            InteractError::NotFound(what) => Self::NotFound(what),
            InteractError::Expired => Self::Expired,
            InteractError::Store(source) => Self::Store(source),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, json!({"error": self.to_string()})),
            Self::Expired => (StatusCode::GONE, json!({"error": self.to_string()})),
            Self::DeliveryNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": self.to_string()}),
            ),
            Self::Delivery(DeliveryError::Validation(reason)) => {
                (StatusCode::BAD_REQUEST, json!({"error": reason}))
            }
            Self::Delivery(DeliveryError::HttpResponse { status, body }) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "Provider rejected email", "status": status, "message": body}),
            ),
            Self::Delivery(e) => {
                tracing::warn!(error = %e, "Mail provider unreachable");
                (StatusCode::BAD_GATEWAY, json!({"error": e.to_string()}))
            }
            Self::Store(e) => {
                tracing::error!(error = %e, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Storage error"}),
                )
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal error"}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use bm_store::StoreErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_interact_error_mapping() {
        let cases = [
            (
                ServerError::from(InteractError::Validation {
                    field: "value",
                    reason: "must not be empty",
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::from(InteractError::NotFound("preview token")),
                StatusCode::NOT_FOUND,
            ),
            (ServerError::from(InteractError::Expired), StatusCode::GONE),
            (
                ServerError::from(InteractError::Store(StoreError::new(
                    StoreErrorKind::Unavailable,
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_delivery_error_mapping() {
        let validation = ServerError::from(DeliveryError::Validation("subject is required"));
        let upstream = ServerError::from(DeliveryError::HttpResponse {
            status: 401,
            body: "bad key".to_owned(),
        });

        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ServerError::DeliveryNotConfigured.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
