//! `bm serve` command implementation.

use std::path::PathBuf;

use bm_config::{CliSettings, Config};
use bm_server::{run_server, server_config_from_config};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover blockmail.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Public base URL for response links (overrides config).
    #[arg(long, env = "BM_API_BASE")]
    api_base: Option<String>,

    /// Database URL (overrides config).
    #[arg(long, env = "BM_DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output (request and storage logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            api_base: self.api_base,
            database_url: self.database_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!("Response links: {}/r/...", config.links.api_base));
        output.info(&format!("Database: {}", config.storage.database_url));
        output.info(&format!(
            "Preview tokens expire after {} hours",
            config.preview.ttl_hours
        ));
        if config.delivery.is_some() {
            output.info("Test sends: enabled");
        } else {
            output.warning("Test sends: disabled (no [delivery] section in config)");
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
