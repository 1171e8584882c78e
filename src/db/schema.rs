//! Database schema definitions and initialization.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::Connection;
use tracing::debug;

/// Current schema version, recorded in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `users`: Local identities created by sign-in
/// - `journal_entries`: Entry text with its five analysis fields
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            entry_text TEXT NOT NULL,
            mood_score REAL NOT NULL,
            mental_state TEXT NOT NULL,
            ai_suggestions TEXT NOT NULL,
            habits TEXT NOT NULL,
            breathing_prompt TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_journal_entries_user_created
            ON journal_entries(user_id, created_at DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(DatabaseError::Sqlite)?;

    Ok(())
}
