//! Error handling utilities for the serenity application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use thiserror::Error;

/// Represents specific error cases that can occur during mood analysis.
///
/// Every failure of the analysis path, on the service side and on the client
/// side, is one of these variants. The service turns each of them into a
/// `500 {"error": ...}` response whose message is this type's `Display` output.
///
/// # Examples
///
/// ```
/// use serenity::errors::AIError;
///
/// let error = AIError::NoToolCall;
/// assert_eq!(format!("{}", error), "No tool call in response");
///
/// let error = AIError::MissingCredential("SERENITY_AI_API_KEY".to_string());
/// assert_eq!(format!("{}", error), "SERENITY_AI_API_KEY is not configured");
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// The completion endpoint credential is absent.
    #[error("{0} is not configured")]
    MissingCredential(String),

    /// The completion endpoint could not be reached.
    #[error("AI API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The analysis service could not be reached from the client.
    #[error("Analysis service request failed: {0}")]
    ServiceUnreachable(#[source] reqwest::Error),

    /// The completion endpoint answered with a non-success status.
    #[error("AI API error: {status}")]
    UpstreamStatus {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// The completion body could not be decoded.
    #[error("Invalid response from AI API: {0}")]
    InvalidResponse(String),

    /// The model answered without calling the analysis function.
    #[error("No tool call in response")]
    NoToolCall,

    /// The function-call arguments are not a well-formed analysis.
    #[error("Failed to parse analysis: {0}")]
    MalformedArguments(String),

    /// The analysis parsed but breaks a field constraint.
    #[error("Analysis violates contract: {0}")]
    ContractViolation(String),

    /// The inbound request to the service is unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The analysis service reported a failure.
    #[error("{0}")]
    Service(String),
}

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use serenity::errors::DatabaseError;
///
/// let error = DatabaseError::NotFound("Entry 42".to_string());
/// assert!(format!("{}", error).contains("not found"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// Requested record not found in database.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored column could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Errors about the signed-in identity.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session is active.
    #[error("Not authenticated. Run `serenity sign-in <email>` first.")]
    NotAuthenticated,

    /// The email given to sign-in is unusable.
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    /// The persisted session file is unreadable.
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Errors from the single-flight submission gate.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Another analysis from the same client is still running.
    #[error("An analysis is already in progress. Please wait for it to finish.")]
    AlreadyInFlight,
}

/// Represents all possible errors that can occur in the serenity application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories.
///
/// # Examples
///
/// ```
/// use serenity::errors::AppError;
///
/// let error = AppError::Config("Missing data directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing data directory");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem or socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors in journal entry handling (e.g., empty input).
    #[error("{0}")]
    Journal(String),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors related to mood analysis.
    #[error("Analysis error: {0}")]
    AI(#[from] AIError),

    /// Errors related to the signed-in session.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Errors from the submission gate.
    #[error("{0}")]
    Submission(#[from] SubmissionError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use serenity::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Journal("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
