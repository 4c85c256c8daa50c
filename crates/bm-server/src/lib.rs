//! HTTP server for blockmail.
//!
//! This crate provides the axum server behind the email builder:
//! - Export endpoints that render documents and inline their CSS
//! - Response links (`/r/{token}/{block}/{value}`) followed from sent emails
//! - Preview token creation and resolution
//! - Test sends through the configured mail provider
//!
//! # Quick Start
//!
//! ```ignore
//! use bm_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 8787,
//!         database_url: "sqlite://blockmail.db".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Editor ──HTTP──► axum server (bm-server)
//!                      │
//!                      ├─► /api/render, /api/export ──► bm-blocks + bm-inline
//!                      │
//!                      ├─► /r/..., /api/preview ──► bm-interact ──► bm-store (SQLite)
//!                      │
//!                      └─► /api/test-send ──► bm-delivery (blocking thread)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use bm_delivery::{HttpMailer, Mailer};
use bm_inline::SizeBudget;
use bm_interact::DEFAULT_PREVIEW_TTL_HOURS;
use bm_store::{PreviewStore, ResponseStore, SqliteStore};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Public base URL embedded in response links.
    pub api_base: String,
    /// sqlx SQLite URL.
    pub database_url: String,
    /// Lifetime of preview tokens created without an explicit TTL.
    pub preview_ttl_hours: u32,
    /// Clipping threshold reported by exports.
    pub clip_threshold_kb: u64,
    /// Mail provider for test sends (`None` disables `/api/test-send`).
    pub delivery: Option<DeliverySettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8787,
            api_base: "http://localhost:8787".to_owned(),
            database_url: "sqlite://blockmail.db".to_owned(),
            preview_ttl_hours: DEFAULT_PREVIEW_TTL_HOURS,
            clip_threshold_kb: SizeBudget::default().threshold_kb,
            delivery: None,
        }
    }
}

/// Mail provider settings.
#[derive(Clone)]
pub struct DeliverySettings {
    /// Provider API base URL.
    pub api_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Sender address.
    pub from: String,
}

impl std::fmt::Debug for DeliverySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySettings")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
    store.ensure_schema().await?;

    let mailer = config.delivery.as_ref().map(|delivery| {
        let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(
            &delivery.api_url,
            delivery.api_key.clone(),
            delivery.from.clone(),
        ));
        mailer
    });
    if mailer.is_none() {
        tracing::info!("No [delivery] section configured, test sends disabled");
    }

    let responses: Arc<dyn ResponseStore> = Arc::<SqliteStore>::clone(&store);
    let previews: Arc<dyn PreviewStore> = Arc::<SqliteStore>::clone(&store);
    let state = Arc::new(AppState {
        responses,
        previews,
        mailer,
        api_base: config.api_base.clone(),
        budget: SizeBudget::new(config.clip_threshold_kb),
        preview_ttl_hours: config.preview_ttl_hours,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, api_base = %config.api_base, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from blockmail config.
#[must_use]
pub fn server_config_from_config(config: &bm_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        api_base: config.links.api_base.clone(),
        database_url: config.storage.database_url.clone(),
        preview_ttl_hours: config.preview.ttl_hours,
        clip_threshold_kb: config.budget.clip_threshold_kb,
        delivery: config.delivery.as_ref().map(|delivery| DeliverySettings {
            api_url: delivery.api_url.clone(),
            api_key: delivery.api_key.clone(),
            from: delivery.from.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_default_config() {
        let config = server_config_from_config(&bm_config::Config::default());

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8787);
        assert_eq!(config.api_base, "http://localhost:8787");
        assert_eq!(config.preview_ttl_hours, 168);
        assert_eq!(config.clip_threshold_kb, 102);
        assert!(config.delivery.is_none());
    }

    #[test]
    fn test_delivery_settings_debug_hides_key() {
        let settings = DeliverySettings {
            api_url: "https://api.example.com".to_owned(),
            api_key: "re_secret".to_owned(),
            from: "a@example.com".to_owned(),
        };

        assert!(!format!("{settings:?}").contains("re_secret"));
    }
}
