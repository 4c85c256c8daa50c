//! In-memory store for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bm_blocks::Document;

use crate::error::{ErrorStatus, StoreError, StoreErrorKind};
use crate::model::{InsertOutcome, PreviewToken, Response};
use crate::store::{PreviewStore, ResponseStore};

const BACKEND: &str = "Memory";

/// Mutex-guarded maps implementing both store traits.
///
/// # Example
///
/// ```ignore
/// use bm_store::{MemoryStore, PreviewStore};
///
/// let store = MemoryStore::new().with_email(document).with_token(token);
/// let found = store.find_token("tok").await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    responses: Mutex<HashMap<(String, String), Response>>,
    tokens: Mutex<HashMap<String, PreviewToken>>,
    emails: Mutex<HashMap<String, Document>>,
    unavailable: AtomicBool,
    fail_increments: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an email snapshot.
    #[must_use]
    pub fn with_email(self, document: Document) -> Self {
        lock(&self.emails).insert(document.id.clone(), document);
        self
    }

    /// Add a preview token.
    #[must_use]
    pub fn with_token(self, token: PreviewToken) -> Self {
        lock(&self.tokens).insert(token.token.clone(), token);
        self
    }

    /// Make every operation fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only view-count increments fail.
    pub fn set_fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    /// All stored responses, unordered.
    pub fn responses(&self) -> Vec<Response> {
        lock(&self.responses).values().cloned().collect()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> StoreError {
    StoreError::new(StoreErrorKind::Unavailable)
        .with_status(ErrorStatus::Temporary)
        .with_backend(BACKEND)
        .with_message("store marked unavailable")
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn insert_response(&self, response: &Response) -> Result<InsertOutcome, StoreError> {
        self.check_available()?;
        let key = (response.block_id.clone(), response.recipient_token.clone());
        let mut responses = lock(&self.responses);
        if responses.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        responses.insert(key, response.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_response(
        &self,
        block_id: &str,
        recipient_token: &str,
    ) -> Result<Option<Response>, StoreError> {
        self.check_available()?;
        let key = (block_id.to_owned(), recipient_token.to_owned());
        Ok(lock(&self.responses).get(&key).cloned())
    }

    async fn tally(&self, block_id: &str) -> Result<BTreeMap<String, u64>, StoreError> {
        self.check_available()?;
        let mut tally = BTreeMap::new();
        for response in lock(&self.responses).values() {
            if response.block_id == block_id {
                *tally.entry(response.value.clone()).or_insert(0) += 1;
            }
        }
        Ok(tally)
    }
}

#[async_trait]
impl PreviewStore for MemoryStore {
    async fn find_token(&self, token: &str) -> Result<Option<PreviewToken>, StoreError> {
        self.check_available()?;
        Ok(lock(&self.tokens).get(token).cloned())
    }

    async fn increment_view_count(&self, token: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut tokens = lock(&self.tokens);
        let entry = tokens.get_mut(token).ok_or_else(|| {
            StoreError::new(StoreErrorKind::NotFound)
                .with_backend(BACKEND)
                .with_message(format!("preview token {token}"))
        })?;
        entry.view_count += 1;
        Ok(entry.view_count)
    }

    async fn insert_token(&self, token: &PreviewToken) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tokens = lock(&self.tokens);
        if tokens.contains_key(&token.token) {
            return Err(StoreError::new(StoreErrorKind::AlreadyExists).with_backend(BACKEND));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn load_email(&self, email_id: &str) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        Ok(lock(&self.emails).get(email_id).cloned())
    }

    async fn save_email(&self, document: &Document) -> Result<(), StoreError> {
        self.check_available()?;
        lock(&self.emails).insert(document.id.clone(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ResponseType;

    fn response(token: &str, value: &str) -> Response {
        Response {
            block_id: "b".to_owned(),
            recipient_token: token.to_owned(),
            response_type: ResponseType::Poll,
            value: value.to_owned(),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_or_ignore() {
        let store = MemoryStore::new();

        assert_eq!(store.insert_response(&response("t", "a")).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            store.insert_response(&response("t", "b")).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(store.find_response("b", "t").await.unwrap().unwrap().value, "a");
        assert_eq!(store.responses().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store.tally("b").await.unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::Unavailable);
        assert!(err.is_temporary());
    }

    #[tokio::test]
    async fn test_fail_increments_only() {
        let store = MemoryStore::new().with_token(PreviewToken {
            token: "p".to_owned(),
            email_id: "e".to_owned(),
            expires_at: Utc::now() + TimeDelta::hours(1),
            view_count: 4,
        });
        store.set_fail_increments(true);

        assert!(store.increment_view_count("p").await.is_err());
        assert_eq!(store.find_token("p").await.unwrap().unwrap().view_count, 4);
    }
}
