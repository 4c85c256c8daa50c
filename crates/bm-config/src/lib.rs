//! Configuration management for blockmail.
//!
//! Parses `blockmail.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `links.api_base`
//! - `storage.database_url`
//! - `delivery.api_url`
//! - `delivery.api_key`
//! - `delivery.from`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override public API base used in interaction links.
    pub api_base: Option<String>,
    /// Override database URL.
    pub database_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "blockmail.toml";

/// Longest allowed preview token lifetime (one year).
const MAX_TTL_HOURS: u32 = 24 * 366;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Interaction link configuration.
    pub links: LinksConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Preview token configuration.
    pub preview: PreviewConfig,
    /// Size budget configuration.
    pub budget: BudgetConfig,
    /// Test-send delivery configuration (optional section).
    pub delivery: Option<DeliveryConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8787,
        }
    }
}

/// Interaction link configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Public base URL of this server, prefix of every `/r/...` link.
    pub api_base: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8787".to_owned(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// sqlx database URL. Relative SQLite paths resolve against the config
    /// file's directory.
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://blockmail.db".to_owned(),
        }
    }
}

/// Preview token configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Lifetime of newly issued preview tokens.
    pub ttl_hours: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { ttl_hours: 7 * 24 }
    }
}

/// Size budget configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Size in kilobytes above which the provider clips the message.
    pub clip_threshold_kb: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            clip_threshold_kb: 102,
        }
    }
}

/// Test-send delivery configuration.
#[derive(Debug, Deserialize)]
pub struct DeliveryConfig {
    /// Provider API base URL.
    #[serde(default = "default_delivery_api_url")]
    pub api_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Sender address.
    pub from: String,
}

impl DeliveryConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api_url, "delivery.api_url")?;
        require_http_url(&self.api_url, "delivery.api_url")?;
        require_non_empty(&self.api_key, "delivery.api_key")?;
        require_non_empty(&self.from, "delivery.from")?;
        if !self.from.contains('@') {
            return Err(ConfigError::Validation(
                "delivery.from must be an email address".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_delivery_api_url() -> String {
    "https://api.resend.com".to_owned()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`delivery.api_key`").
        field: String,
        /// Error message (e.g., "${`RESEND_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `blockmail.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(api_base) = &settings.api_base {
            self.links.api_base.clone_from(api_base);
        }
        if let Some(database_url) = &settings.database_url {
            self.storage.database_url.clone_from(database_url);
        }
    }

    /// Get validated delivery configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_delivery(&self) -> Result<&DeliveryConfig, ConfigError> {
        let delivery = self.delivery.as_ref().ok_or_else(|| {
            ConfigError::Validation("[delivery] section required in config".into())
        })?;
        delivery.validate()?;
        Ok(delivery)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. The `[delivery]`
    /// section is validated when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_non_empty(&self.links.api_base, "links.api_base")?;
        require_http_url(&self.links.api_base, "links.api_base")?;

        if !self.storage.database_url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(
                "storage.database_url must be a sqlite: URL".to_owned(),
            ));
        }

        let ttl = self.preview.ttl_hours;
        if ttl == 0 {
            return Err(ConfigError::Validation(
                "preview.ttl_hours must be greater than 0".to_owned(),
            ));
        }
        if ttl > MAX_TTL_HOURS {
            return Err(ConfigError::Validation(format!(
                "preview.ttl_hours cannot exceed {MAX_TTL_HOURS}"
            )));
        }

        if self.budget.clip_threshold_kb == 0 {
            return Err(ConfigError::Validation(
                "budget.clip_threshold_kb must be greater than 0".to_owned(),
            ));
        }

        if let Some(delivery) = &self.delivery {
            delivery.validate()?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.links.api_base = expand::expand_env(&self.links.api_base, "links.api_base")?;
        self.storage.database_url =
            expand::expand_env(&self.storage.database_url, "storage.database_url")?;

        if let Some(ref mut delivery) = self.delivery {
            delivery.api_url = expand::expand_env(&delivery.api_url, "delivery.api_url")?;
            delivery.api_key = expand::expand_env(&delivery.api_key, "delivery.api_key")?;
            delivery.from = expand::expand_env(&delivery.from, "delivery.from")?;
        }

        Ok(())
    }

    /// Resolve a relative SQLite file path against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let url = &self.storage.database_url;
        let Some(path) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) else {
            return;
        };
        let file = path.split('?').next().unwrap_or(path);
        if file.is_empty() || file.starts_with(':') || Path::new(file).is_absolute() {
            return;
        }
        let query = &path[file.len()..];
        self.storage.database_url = format!("sqlite://{}{query}", config_dir.join(file).display());
    }
}
