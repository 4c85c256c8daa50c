//! SQLite backend.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use bm_blocks::Document;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::{StoreError, StoreErrorKind};
use crate::model::{InsertOutcome, PreviewToken, Response, ResponseType};
use crate::store::{PreviewStore, ResponseStore};

const BACKEND: &str = "Sqlite";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    block_id TEXT NOT NULL,
    recipient_token TEXT NOT NULL,
    response_type TEXT NOT NULL,
    value TEXT NOT NULL,
    recorded_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS responses_block_recipient
    ON responses (block_id, recipient_token);
CREATE TABLE IF NOT EXISTS preview_tokens (
    token TEXT PRIMARY KEY,
    email_id TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    view_count INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS emails (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL
);
";

/// Store backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool for `url` (e.g. `sqlite://blockmail.db`), creating the
    /// database file if needed.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::sqlx)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StoreError::sqlx)?;
        tracing::debug!(url, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(StoreError::sqlx)?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        StoreError::new(StoreErrorKind::Other)
            .with_backend(BACKEND)
            .with_message(format!("timestamp out of range: {secs}"))
    })
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl ResponseStore for SqliteStore {
    async fn insert_response(&self, response: &Response) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            "INSERT INTO responses (block_id, recipient_token, response_type, value, recorded_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (block_id, recipient_token) DO NOTHING",
        )
        .bind(&response.block_id)
        .bind(&response.recipient_token)
        .bind(response.response_type.as_str())
        .bind(&response.value)
        .bind(response.recorded_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;

        Ok(if result.rows_affected() == 0 {
            InsertOutcome::AlreadyExists
        } else {
            InsertOutcome::Inserted
        })
    }

    async fn find_response(
        &self,
        block_id: &str,
        recipient_token: &str,
    ) -> Result<Option<Response>, StoreError> {
        let row: Option<(String, String, String, String, i64)> = sqlx::query_as(
            "SELECT block_id, recipient_token, response_type, value, recorded_at
             FROM responses WHERE block_id = ? AND recipient_token = ?",
        )
        .bind(block_id)
        .bind(recipient_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;

        let Some((block_id, recipient_token, response_type, value, recorded_at)) = row else {
            return Ok(None);
        };
        let response_type = ResponseType::from_str(&response_type).map_err(|message| {
            StoreError::new(StoreErrorKind::Other)
                .with_backend(BACKEND)
                .with_message(message)
        })?;
        Ok(Some(Response {
            block_id,
            recipient_token,
            response_type,
            value,
            recorded_at: timestamp(recorded_at)?,
        }))
    }

    async fn tally(&self, block_id: &str) -> Result<BTreeMap<String, u64>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT value, COUNT(*) FROM responses WHERE block_id = ? GROUP BY value",
        )
        .bind(block_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;

        Ok(rows
            .into_iter()
            .map(|(value, n)| (value, count(n)))
            .collect())
    }
}

#[async_trait]
impl PreviewStore for SqliteStore {
    async fn find_token(&self, token: &str) -> Result<Option<PreviewToken>, StoreError> {
        let row: Option<(String, String, i64, i64)> = sqlx::query_as(
            "SELECT token, email_id, expires_at, view_count FROM preview_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;

        row.map(|(token, email_id, expires_at, view_count)| {
            Ok(PreviewToken {
                token,
                email_id,
                expires_at: timestamp(expires_at)?,
                view_count: count(view_count),
            })
        })
        .transpose()
    }

    async fn increment_view_count(&self, token: &str) -> Result<u64, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE preview_tokens SET view_count = view_count + 1
             WHERE token = ? RETURNING view_count",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;

        row.map(|(n,)| count(n)).ok_or_else(|| {
            StoreError::new(StoreErrorKind::NotFound)
                .with_backend(BACKEND)
                .with_message(format!("preview token {token}"))
        })
    }

    async fn insert_token(&self, token: &PreviewToken) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO preview_tokens (token, email_id, expires_at, view_count) VALUES (?, ?, ?, ?)",
        )
        .bind(&token.token)
        .bind(&token.email_id)
        .bind(token.expires_at.timestamp())
        .bind(i64::try_from(token.view_count).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;
        Ok(())
    }

    async fn load_email(&self, email_id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT document FROM emails WHERE id = ?")
            .bind(email_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::sqlx)?;

        row.map(|(json,)| {
            Document::from_json(&json).map_err(|e| {
                StoreError::new(StoreErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })
        })
        .transpose()
    }

    async fn save_email(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_string(document).map_err(|e| {
            StoreError::new(StoreErrorKind::Other)
                .with_backend(BACKEND)
                .with_source(e)
        })?;
        sqlx::query(
            "INSERT INTO emails (id, document) VALUES (?, ?)
             ON CONFLICT (id) DO UPDATE SET document = excluded.document",
        )
        .bind(&document.id)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(StoreError::sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bm_blocks::{Block, BlockType};
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    async fn store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let store = SqliteStore::connect(&url).await.unwrap();
        store.ensure_schema().await.unwrap();
        (dir, store)
    }

    fn response(block: &str, token: &str, value: &str) -> Response {
        Response {
            block_id: block.to_owned(),
            recipient_token: token.to_owned(),
            response_type: ResponseType::for_value(value),
            value: value.to_owned(),
            recorded_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ensure_schema_is_repeatable() {
        let (_dir, store) = store().await;

        store.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_first_response_wins() {
        let (_dir, store) = store().await;

        let first = store.insert_response(&response("b1", "tok", "a")).await.unwrap();
        let again = store.insert_response(&response("b1", "tok", "a")).await.unwrap();
        let other = store.insert_response(&response("b1", "tok", "b")).await.unwrap();

        assert_eq!(first, InsertOutcome::Inserted);
        assert_eq!(again, InsertOutcome::AlreadyExists);
        assert_eq!(other, InsertOutcome::AlreadyExists);
        let stored = store.find_response("b1", "tok").await.unwrap().unwrap();
        assert_eq!(stored, response("b1", "tok", "a"));
    }

    #[tokio::test]
    async fn test_same_token_different_blocks() {
        let (_dir, store) = store().await;

        store.insert_response(&response("b1", "tok", "a")).await.unwrap();
        let outcome = store.insert_response(&response("b2", "tok", "love")).await.unwrap();

        assert_eq!(outcome, InsertOutcome::Inserted);
        let stored = store.find_response("b2", "tok").await.unwrap().unwrap();
        assert_eq!(stored.response_type, ResponseType::Feedback);
    }

    #[tokio::test]
    async fn test_tally_groups_by_value() {
        let (_dir, store) = store().await;
        for (token, value) in [("t1", "a"), ("t2", "b"), ("t3", "a"), ("t1", "b")] {
            store.insert_response(&response("poll", token, value)).await.unwrap();
        }

        let tally = store.tally("poll").await.unwrap();

        assert_eq!(tally, BTreeMap::from([("a".to_owned(), 2), ("b".to_owned(), 1)]));
        assert!(store.tally("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_round_trip_and_increment() {
        let (_dir, store) = store().await;
        let token = PreviewToken {
            token: "p1".to_owned(),
            email_id: "e1".to_owned(),
            expires_at: DateTime::from_timestamp(1_900_000_000, 0).unwrap(),
            view_count: 0,
        };
        store.insert_token(&token).await.unwrap();

        assert_eq!(store.find_token("p1").await.unwrap(), Some(token));
        assert_eq!(store.increment_view_count("p1").await.unwrap(), 1);
        assert_eq!(store.increment_view_count("p1").await.unwrap(), 2);
        assert_eq!(store.find_token("p1").await.unwrap().unwrap().view_count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let (_dir, store) = store().await;
        let token = PreviewToken {
            token: "p1".to_owned(),
            email_id: "e1".to_owned(),
            expires_at: Utc::now() + TimeDelta::hours(1),
            view_count: 0,
        };
        store.insert_token(&token).await.unwrap();

        let err = store.insert_token(&token).await.unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_increment_unknown_token_not_found() {
        let (_dir, store) = store().await;

        let err = store.increment_view_count("nope").await.unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_increments_not_lost() {
        let (_dir, store) = store().await;
        store
            .insert_token(&PreviewToken {
                token: "p".to_owned(),
                email_id: "e".to_owned(),
                expires_at: Utc::now() + TimeDelta::hours(1),
                view_count: 0,
            })
            .await
            .unwrap();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_view_count("p").await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.find_token("p").await.unwrap().unwrap().view_count, 20);
    }

    #[tokio::test]
    async fn test_email_snapshot_upsert() {
        let (_dir, store) = store().await;
        let mut document = Document {
            id: "e1".to_owned(),
            subject: "First".to_owned(),
            preheader: None,
            blocks: vec![Block::new("b1", BlockType::QuickPoll).with_prop("question", "Pick")],
        };
        store.save_email(&document).await.unwrap();
        document.subject = "Second".to_owned();
        store.save_email(&document).await.unwrap();

        assert_eq!(store.load_email("e1").await.unwrap(), Some(document));
        assert_eq!(store.load_email("e2").await.unwrap(), None);
    }
}
