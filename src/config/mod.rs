//! Configuration management for the serenity application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. The same `Config` drives the analysis service
//! (`serve`) and the journaling client commands.
//!
//! # Environment Variables
//!
//! - `SERENITY_DIR`: Data directory (defaults to ~/.serenity)
//! - `SERENITY_AI_API_KEY`: Credential for the completion endpoint (service only)
//! - `SERENITY_AI_URL`: Completion endpoint URL
//! - `SERENITY_AI_MODEL`: Completion model identifier
//! - `SERENITY_BIND`: Address the analysis service listens on
//! - `SERENITY_SERVICE_URL`: Analysis service URL used by the client
//! - `SERENITY_CLIENT_KEY`: Key the client presents to the analysis service
//! - `SERENITY_HISTORY_LIMIT`: Number of entries shown in history
//! - `SERENITY_LOG_FORMAT`: `text` or `json`

use crate::constants::{
    DB_FILE_NAME, DEFAULT_AI_MODEL, DEFAULT_AI_URL, DEFAULT_BIND_ADDR, DEFAULT_DATA_SUBDIR,
    DEFAULT_HISTORY_LIMIT, DEFAULT_SERVICE_URL, DRAFT_FILE_NAME, ENV_VAR_AI_API_KEY,
    ENV_VAR_AI_MODEL, ENV_VAR_AI_URL, ENV_VAR_BIND, ENV_VAR_CLIENT_KEY, ENV_VAR_HISTORY_LIMIT,
    ENV_VAR_HOME, ENV_VAR_LOG_FORMAT, ENV_VAR_SERENITY_DIR, ENV_VAR_SERVICE_URL, LOG_FORMAT_JSON,
    LOG_FORMAT_TEXT, REDACTED_PLACEHOLDER, SESSION_FILE_NAME,
};
use crate::errors::{AppError, AppResult};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Configuration for the serenity application.
///
/// # Examples
///
/// Loading configuration from environment variables:
/// ```no_run
/// use serenity::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// config.validate().expect("Invalid configuration");
/// println!("Service URL: {}", config.service_url);
/// ```
pub struct Config {
    /// Directory holding the database, the session file and drafts.
    pub data_dir: PathBuf,

    /// Bearer credential for the completion endpoint.
    ///
    /// Optional at load time: the service reports its absence on each request.
    pub ai_api_key: Option<SecretString>,

    /// Chat-completion endpoint URL.
    pub ai_url: String,

    /// Model identifier sent to the completion endpoint.
    pub ai_model: String,

    /// Socket address the analysis service binds to.
    pub bind_addr: String,

    /// URL of the analysis endpoint the client calls.
    pub service_url: String,

    /// Key sent by the client in the `apikey` and `authorization` headers.
    pub client_key: Option<SecretString>,

    /// Number of entries shown by `history`.
    pub history_limit: usize,

    /// Log output format (`text` or `json`).
    pub log_format: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &REDACTED_PLACEHOLDER)
            .field(
                "ai_api_key",
                &self.ai_api_key.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("ai_url", &self.ai_url)
            .field("ai_model", &self.ai_model)
            .field("bind_addr", &self.bind_addr)
            .field("service_url", &self.service_url)
            .field(
                "client_key",
                &self.client_key.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("history_limit", &self.history_limit)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for Config {
    /// Creates a new Config with default values and no data directory.
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(""),
            ai_api_key: None,
            ai_url: DEFAULT_AI_URL.to_string(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            client_key: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_format: LOG_FORMAT_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data directory path is expanded with `shellexpand` to handle `~`
    /// and environment variable references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The data directory path expansion fails or yields an empty path
    /// - `SERENITY_HISTORY_LIMIT` is not a positive integer
    /// - `SERENITY_LOG_FORMAT` is not `text` or `json`
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_SERENITY_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let history_limit = match env::var(ENV_VAR_HISTORY_LIMIT) {
            Ok(raw) => Self::parse_history_limit(&raw)?,
            Err(_) => DEFAULT_HISTORY_LIMIT,
        };

        let log_format = env::var(ENV_VAR_LOG_FORMAT)
            .unwrap_or_else(|_| LOG_FORMAT_TEXT.to_string())
            .to_lowercase();
        Self::validate_log_format(&log_format)?;

        let config = Config {
            data_dir,
            ai_api_key: non_empty_secret(ENV_VAR_AI_API_KEY),
            ai_url: env::var(ENV_VAR_AI_URL).unwrap_or_else(|_| DEFAULT_AI_URL.to_string()),
            ai_model: env::var(ENV_VAR_AI_MODEL).unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            bind_addr: env::var(ENV_VAR_BIND).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            service_url: env::var(ENV_VAR_SERVICE_URL)
                .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string()),
            client_key: non_empty_secret(ENV_VAR_CLIENT_KEY),
            history_limit,
            log_format,
        };

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data directory path is empty"
    /// - "Data directory must be an absolute path"
    /// - "History limit must be at least 1"
    /// - "Invalid URL ..." for either endpoint URL
    /// - "Invalid bind address ..." if the bind address is not `host:port`
    ///
    /// # Examples
    ///
    /// ```
    /// use serenity::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config {
    ///     data_dir: PathBuf::from("/absolute/path"),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_ok());
    ///
    /// let config = Config {
    ///     data_dir: PathBuf::from("relative/path"),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        if self.history_limit == 0 {
            return Err(AppError::Config(
                "History limit must be at least 1".to_string(),
            ));
        }

        Self::validate_url("AI endpoint", &self.ai_url)?;
        Self::validate_url("service", &self.service_url)?;

        self.bind_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("Invalid bind address '{}': {}", self.bind_addr, e))
        })?;

        Self::validate_log_format(&self.log_format)
    }

    /// Path of the SQLite database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Path of the persisted session.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }

    /// Path of the unsent draft.
    pub fn draft_path(&self) -> PathBuf {
        self.data_dir.join(DRAFT_FILE_NAME)
    }

    fn parse_history_limit(raw: &str) -> AppResult<usize> {
        match raw.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(AppError::Config(format!(
                "{} must be a positive integer, got '{}'",
                ENV_VAR_HISTORY_LIMIT, raw
            ))),
        }
    }

    fn validate_log_format(format: &str) -> AppResult<()> {
        if format == LOG_FORMAT_TEXT || format == LOG_FORMAT_JSON {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "Invalid log format '{}'. Use '{}' or '{}'",
                format, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            )))
        }
    }

    fn validate_url(name: &str, url: &str) -> AppResult<()> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::Config(format!("Invalid URL for {}: '{}': {}", name, url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(AppError::Config(format!(
                "Invalid URL for {}: unsupported scheme '{}'",
                name, other
            ))),
        }
    }
}

/// Reads a secret from the environment, treating an empty value as unset.
fn non_empty_secret(var: &str) -> Option<SecretString> {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Copies a secret without exposing it outside this call.
pub fn duplicate_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// Ensures the data directory exists, creating it with owner-only permissions.
///
/// # Errors
///
/// Returns `AppError::Config` for a relative path and `AppError::Io` if the
/// directory cannot be created.
pub fn ensure_data_dir(data_dir: &Path) -> AppResult<()> {
    if !data_dir.is_absolute() {
        return Err(AppError::Config(format!(
            "Data directory path must be absolute: {}",
            data_dir.display()
        )));
    }

    if !data_dir.exists() {
        fs::create_dir_all(data_dir).map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create data directory: {}", e),
            ))
        })?;

        #[cfg(unix)]
        {
            let permissions =
                fs::Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
            fs::set_permissions(data_dir, permissions)?;
            debug!("Set 0o700 permissions on data directory");
        }
    }
    Ok(())
}
