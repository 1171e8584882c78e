//! Local user identities.

use crate::errors::{AppError, AppResult, DatabaseError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

/// Returns the id of the user with `email`, creating the user if needed.
///
/// The email must already be normalised by the caller.
pub fn find_or_create_user(conn: &Connection, email: &str) -> AppResult<Uuid> {
    if let Some(id) = find_user(conn, email)? {
        debug!("Found existing user {}", id);
        return Ok(id);
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
        params![id.to_string(), email, Utc::now().to_rfc3339()],
    )
    .map_err(DatabaseError::Sqlite)?;

    debug!("Created user {}", id);
    Ok(id)
}

/// Looks up a user id by email.
pub fn find_user(conn: &Connection, email: &str) -> AppResult<Option<Uuid>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()
        .map_err(DatabaseError::Sqlite)?;

    raw.map(|id| {
        Uuid::parse_str(&id)
            .map_err(|e| AppError::from(DatabaseError::Corrupt(format!("user id '{}': {}", id, e))))
    })
    .transpose()
}
