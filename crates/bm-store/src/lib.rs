//! Storage for blockmail interaction state.
//!
//! Two record families are shared between requests:
//!
//! - **Responses**: one row per `(block_id, recipient_token)`, written with
//!   insert-or-ignore so the first click wins.
//! - **Preview tokens**: time-limited handles to email snapshots with a view
//!   counter that is incremented atomically.
//!
//! # Backends
//!
//! - [`SqliteStore`] (sqlx) for deployments
//! - [`MemoryStore`] for tests (behind `mock` feature flag)

mod error;
#[cfg(feature = "mock")]
mod mock;
mod model;
mod sqlite;
mod store;

pub use error::{ErrorStatus, StoreError, StoreErrorKind};
#[cfg(feature = "mock")]
pub use mock::MemoryStore;
pub use model::{InsertOutcome, PreviewToken, Response, ResponseType};
pub use sqlite::SqliteStore;
pub use store::{PreviewStore, ResponseStore};
