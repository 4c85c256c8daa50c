//! Response recording for interaction links.
//!
//! Each option in an exported email links to
//! `{api_base}/r/{export_token}/{block_id}/{value}`. Following a link records
//! the value once per recipient and block; later clicks, prefetches by link
//! scanners and races between them all leave the first value in place.

use std::collections::BTreeMap;

use bm_store::{InsertOutcome, Response, ResponseStore, ResponseType, StoreErrorKind};
use chrono::Utc;
use serde::Serialize;

use crate::error::InteractError;

/// Upper bound for each link segment.
pub const MAX_SEGMENT_BYTES: usize = 256;

/// Outcome of [`record_response`]. Callers must not expose the difference to
/// the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Recorded,
    AlreadyRecorded,
}

const CONFIRMATION_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>Thanks for your response</title>
<style>
body{margin:0;font-family:Arial,Helvetica,sans-serif;background:#f4f4f7;color:#1f2937;}
.card{max-width:420px;margin:80px auto;padding:32px;background:#ffffff;border-radius:8px;text-align:center;}
h1{font-size:22px;margin:0 0 12px;}
p{font-size:15px;line-height:1.5;margin:0;color:#4b5563;}
</style>
</head>
<body>
<div class="card">
<h1>Thanks for your response</h1>
<p>Your answer has been received. You can close this window.</p>
</div>
</body>
</html>
"#;

/// The page shown after following any interaction link, whatever the outcome.
pub fn confirmation_page() -> &'static str {
    CONFIRMATION_PAGE
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), InteractError> {
    if value.trim().is_empty() {
        return Err(InteractError::Validation {
            field,
            reason: "must not be empty",
        });
    }
    if value.len() > MAX_SEGMENT_BYTES {
        return Err(InteractError::Validation {
            field,
            reason: "must be at most 256 bytes",
        });
    }
    Ok(())
}

/// Record `value` for the recipient identified by `export_token`.
///
/// Insert-or-ignore: a second call for the same `(block_id, export_token)`
/// succeeds with [`RecordStatus::AlreadyRecorded`] and leaves the stored value
/// unchanged.
///
/// # Errors
///
/// Returns [`InteractError::Validation`] for empty or oversized segments and
/// [`InteractError::Store`] when the backend fails.
pub async fn record_response(
    store: &dyn ResponseStore,
    export_token: &str,
    block_id: &str,
    value: &str,
) -> Result<RecordStatus, InteractError> {
    validate_segment("token", export_token)?;
    validate_segment("block id", block_id)?;
    validate_segment("value", value)?;

    let response = Response {
        block_id: block_id.to_owned(),
        recipient_token: export_token.to_owned(),
        response_type: ResponseType::for_value(value),
        value: value.to_owned(),
        recorded_at: Utc::now(),
    };

    let status = match store.insert_response(&response).await {
        Ok(InsertOutcome::Inserted) => RecordStatus::Recorded,
        Ok(InsertOutcome::AlreadyExists) => RecordStatus::AlreadyRecorded,
        // Backends without insert-or-ignore surface the unique violation.
        Err(err) if err.kind == StoreErrorKind::AlreadyExists => RecordStatus::AlreadyRecorded,
        Err(err) => return Err(err.into()),
    };

    tracing::debug!(
        block = %block_id,
        response_type = %response.response_type,
        ?status,
        "Interaction link followed"
    );
    Ok(status)
}

/// Count recorded values for a block.
///
/// # Errors
///
/// Returns [`InteractError::Validation`] for an empty block id and
/// [`InteractError::Store`] when the backend fails.
pub async fn tally(
    store: &dyn ResponseStore,
    block_id: &str,
) -> Result<BTreeMap<String, u64>, InteractError> {
    validate_segment("block id", block_id)?;
    Ok(store.tally(block_id).await?)
}
