//! Interaction recording and preview tokens for blockmail.
//!
//! Exported emails run no script, so interactivity is faked with one link per
//! answer. This crate owns the server side of those links:
//!
//! - [`record_response`]: insert-or-ignore of a clicked value, first click wins
//! - [`confirmation_page`]: the single page shown for every outcome
//! - [`resolve_preview`] / [`create_preview`]: time-limited snapshot access
//!
//! Storage is abstracted by the [`bm_store`] traits.

mod error;
mod preview;
mod responses;

pub use bm_store::ResponseType;
pub use error::InteractError;
pub use preview::{
    DEFAULT_PREVIEW_TTL_HOURS, MAX_PREVIEW_TTL_HOURS, PreviewSnapshot, create_preview,
    resolve_preview, ttl_hours,
};
pub use responses::{MAX_SEGMENT_BYTES, RecordStatus, confirmation_page, record_response, tally};
