//! Storage traits.
//!
//! The server holds backends as `Arc<dyn ResponseStore>` and
//! `Arc<dyn PreviewStore>`; every mutation the interaction layer needs is a
//! single call here so the backend can make it atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bm_blocks::Document;

use crate::error::StoreError;
use crate::model::{InsertOutcome, PreviewToken, Response};

/// Recorded poll and feedback responses.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Insert a response unless one exists for the same
    /// `(block_id, recipient_token)`. An existing row is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails. A duplicate is not an error.
    async fn insert_response(&self, response: &Response) -> Result<InsertOutcome, StoreError>;

    /// Look up the response recorded for a recipient on a block.
    async fn find_response(
        &self,
        block_id: &str,
        recipient_token: &str,
    ) -> Result<Option<Response>, StoreError>;

    /// Count responses per value for a block.
    async fn tally(&self, block_id: &str) -> Result<BTreeMap<String, u64>, StoreError>;
}

/// Preview tokens and the email snapshots they point at.
#[async_trait]
pub trait PreviewStore: Send + Sync {
    async fn find_token(&self, token: &str) -> Result<Option<PreviewToken>, StoreError>;

    /// Atomically add one to the token's view count and return the new value.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` [`StoreError`] if the token does not exist.
    async fn increment_view_count(&self, token: &str) -> Result<u64, StoreError>;

    /// # Errors
    ///
    /// Returns an `AlreadyExists` [`StoreError`] if the token is taken.
    async fn insert_token(&self, token: &PreviewToken) -> Result<(), StoreError>;

    async fn load_email(&self, email_id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert or replace the snapshot stored under `document.id`.
    async fn save_email(&self, document: &Document) -> Result<(), StoreError>;
}
