//! Preview token lifecycle.
//!
//! A token grants read access to one email snapshot until it expires. Expiry
//! is terminal and checked on every resolve; no cleanup job is involved.

use bm_blocks::Document;
use bm_store::{PreviewStore, PreviewToken};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::InteractError;

/// Token lifetime when none is configured.
pub const DEFAULT_PREVIEW_TTL_HOURS: u32 = 7 * 24;

/// Longest token lifetime accepted (one year).
pub const MAX_PREVIEW_TTL_HOURS: u32 = 24 * 366;

/// A resolved preview: the snapshot and the token with its updated count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSnapshot {
    pub email: Document,
    pub token: PreviewToken,
}

/// Resolve `token` at time `now` and count the view.
///
/// The view count is incremented atomically by the store. If the increment
/// fails the snapshot is still returned with the last known count.
///
/// # Errors
///
/// - [`InteractError::NotFound`] if the token or its email does not exist
/// - [`InteractError::Expired`] if `now >= expires_at`; the count is untouched
/// - [`InteractError::Store`] if a lookup fails
pub async fn resolve_preview(
    store: &dyn PreviewStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<PreviewSnapshot, InteractError> {
    if token.is_empty() {
        return Err(InteractError::NotFound("preview token"));
    }
    let mut record = store
        .find_token(token)
        .await?
        .ok_or(InteractError::NotFound("preview token"))?;

    if record.is_expired_at(now) {
        tracing::debug!(email = %record.email_id, "Preview token expired");
        return Err(InteractError::Expired);
    }

    let email = store
        .load_email(&record.email_id)
        .await?
        .ok_or(InteractError::NotFound("email"))?;

    match store.increment_view_count(token).await {
        Ok(count) => record.view_count = count,
        Err(err) => {
            tracing::warn!(email = %record.email_id, error = %err, "Failed to record preview view");
        }
    }

    Ok(PreviewSnapshot {
        email,
        token: record,
    })
}

/// Issue a new token for an existing email snapshot.
///
/// # Errors
///
/// - [`InteractError::Validation`] for an empty id, or a `ttl` that is not
///   positive or exceeds [`MAX_PREVIEW_TTL_HOURS`]
/// - [`InteractError::NotFound`] if the email does not exist
/// - [`InteractError::Store`] if the store fails
pub async fn create_preview(
    store: &dyn PreviewStore,
    email_id: &str,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> Result<PreviewToken, InteractError> {
    if email_id.trim().is_empty() {
        return Err(InteractError::Validation {
            field: "email id",
            reason: "must not be empty",
        });
    }
    if ttl <= TimeDelta::zero() {
        return Err(InteractError::Validation {
            field: "ttl",
            reason: "must be positive",
        });
    }
    if ttl > ttl_hours(MAX_PREVIEW_TTL_HOURS) {
        return Err(InteractError::Validation {
            field: "ttl",
            reason: "must be at most one year",
        });
    }
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or(InteractError::Validation {
            field: "ttl",
            reason: "expiry is out of range",
        })?;
    if store.load_email(email_id).await?.is_none() {
        return Err(InteractError::NotFound("email"));
    }

    let token = PreviewToken {
        token: Uuid::new_v4().to_string(),
        email_id: email_id.to_owned(),
        expires_at,
        view_count: 0,
    };
    store.insert_token(&token).await?;
    tracing::info!(email = %email_id, expires_at = %token.expires_at, "Created preview token");
    Ok(token)
}

/// TTL for a number of hours.
pub fn ttl_hours(hours: u32) -> TimeDelta {
    TimeDelta::hours(i64::from(hours))
}
