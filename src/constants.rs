//! Constants used throughout the application.
//!
//! This module contains all constants used in the SerenityMind application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "serenity";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "An AI-powered mood journal for mental wellness";
/// Value sent in the `x-client-info` header by the analysis client.
pub const CLIENT_INFO: &str = concat!("serenity/", env!("CARGO_PKG_VERSION"));

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the data directory (database, session, drafts).
pub const ENV_VAR_SERENITY_DIR: &str = "SERENITY_DIR";
/// Environment variable holding the completion endpoint credential.
pub const ENV_VAR_AI_API_KEY: &str = "SERENITY_AI_API_KEY";
/// Environment variable overriding the completion endpoint URL.
pub const ENV_VAR_AI_URL: &str = "SERENITY_AI_URL";
/// Environment variable overriding the completion model.
pub const ENV_VAR_AI_MODEL: &str = "SERENITY_AI_MODEL";
/// Environment variable for the service bind address.
pub const ENV_VAR_BIND: &str = "SERENITY_BIND";
/// Environment variable for the analysis service URL used by the client.
pub const ENV_VAR_SERVICE_URL: &str = "SERENITY_SERVICE_URL";
/// Environment variable for the key the client presents to the service.
pub const ENV_VAR_CLIENT_KEY: &str = "SERENITY_CLIENT_KEY";
/// Environment variable for the number of entries shown in history.
pub const ENV_VAR_HISTORY_LIMIT: &str = "SERENITY_HISTORY_LIMIT";
/// Environment variable selecting the log format.
pub const ENV_VAR_LOG_FORMAT: &str = "SERENITY_LOG_FORMAT";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";

// Defaults
/// Default data directory, relative to the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".serenity";
/// Default completion endpoint.
pub const DEFAULT_AI_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
/// Default completion model.
pub const DEFAULT_AI_MODEL: &str = "google/gemini-2.5-flash";
/// Default bind address of the analysis service.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
/// Default URL of the analysis service.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8787/analyze-mood";
/// Default number of entries shown in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 7;
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System
/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "serenity.db";
/// Session file name inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";
/// Draft file name inside the data directory.
pub const DRAFT_FILE_NAME: &str = "draft.txt";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;

// Service
/// Path of the mood analysis endpoint.
pub const ANALYZE_MOOD_PATH: &str = "/analyze-mood";
/// Headers a browser is allowed to send cross-origin.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

// Analysis Contract
/// Name of the function the model is forced to call.
pub const ANALYSIS_TOOL_NAME: &str = "analyze_mental_state";
/// Lowest valid mood score.
pub const MOOD_SCORE_MIN: f64 = 0.0;
/// Highest valid mood score.
pub const MOOD_SCORE_MAX: f64 = 100.0;
/// Minimum number of suggestions or habits.
pub const MIN_RECOMMENDATIONS: usize = 3;
/// Maximum number of suggestions or habits.
pub const MAX_RECOMMENDATIONS: usize = 5;

// Presentation
/// Number of cells in the rendered mood score bar.
pub const SCORE_BAR_WIDTH: usize = 20;
/// Date format used in history listings.
pub const HISTORY_DATE_FORMAT: &str = "%b %d, %Y";
