//! Journal entry persistence.
//!
//! Two operations back the application: insert-and-return of an analysed
//! entry, and an ordered read of a user's most recent entries.

use crate::analysis::{MentalState, MoodAnalysis};
use crate::errors::{AppError, AppResult, DatabaseError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tracing::debug;
use uuid::Uuid;

/// A persisted journal entry with its analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_text: String,
    pub analysis: MoodAnalysis,
    pub created_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, user_id, entry_text, mood_score, mental_state, \
     ai_suggestions, habits, breathing_prompt, created_at";

/// Stores an analysed entry and returns the stored record.
///
/// # Errors
///
/// Returns an error if the insert or the read-back fails. Nothing is retried.
pub fn insert_entry(
    conn: &Connection,
    user_id: Uuid,
    entry_text: &str,
    analysis: &MoodAnalysis,
) -> AppResult<JournalRecord> {
    insert_entry_at(conn, user_id, entry_text, analysis, Utc::now())
}

pub(crate) fn insert_entry_at(
    conn: &Connection,
    user_id: Uuid,
    entry_text: &str,
    analysis: &MoodAnalysis,
    created_at: DateTime<Utc>,
) -> AppResult<JournalRecord> {
    let id = Uuid::new_v4();
    debug!("Inserting entry {} for user {}", id, user_id);

    let suggestions = serde_json::to_string(&analysis.suggestions)
        .map_err(|e| DatabaseError::Corrupt(format!("suggestions: {}", e)))?;
    let habits = serde_json::to_string(&analysis.habits)
        .map_err(|e| DatabaseError::Corrupt(format!("habits: {}", e)))?;

    conn.execute(
        r#"
        INSERT INTO journal_entries (
            id, user_id, entry_text, mood_score, mental_state,
            ai_suggestions, habits, breathing_prompt, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            id.to_string(),
            user_id.to_string(),
            entry_text,
            analysis.mood_score,
            analysis.mental_state.as_str(),
            suggestions,
            habits,
            analysis.breathing_prompt,
            created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    let record = conn
        .query_row(
            &format!("SELECT {} FROM journal_entries WHERE id = ?1", SELECT_COLUMNS),
            params![id.to_string()],
            map_record,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DatabaseError::NotFound(format!("Entry with id {} not found", id))
            }
            _ => DatabaseError::Sqlite(e),
        })?;

    Ok(record)
}

/// Reads the most recent `limit` entries of a user, newest first.
///
/// # Errors
///
/// Returns `AppError::Config` if `limit` does not fit a SQLite integer.
pub fn recent_entries(
    conn: &Connection,
    user_id: Uuid,
    limit: usize,
) -> AppResult<Vec<JournalRecord>> {
    debug!("Reading {} most recent entries for user {}", limit, user_id);

    // SQLite treats a negative LIMIT as unbounded.
    let sql_limit = i64::try_from(limit)
        .map_err(|_| AppError::Config(format!("History limit {} is too large", limit)))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM journal_entries WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            SELECT_COLUMNS
        ))
        .map_err(DatabaseError::Sqlite)?;

    let records = stmt
        .query_map(params![user_id.to_string(), sql_limit], map_record)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(records)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&row.get::<_, String>(idx)?).map_err(|e| conversion_error(idx, e))
}

fn parse_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&row.get::<_, String>(idx)?).map_err(|e| conversion_error(idx, e))
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<JournalRecord> {
    let mental_state: MentalState = row.get::<_, String>(4)?.parse().map_err(|e: String| {
        conversion_error(4, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;

    let created_at = DateTime::parse_from_rfc3339(&row.get::<_, String>(8)?)
        .map_err(|e| conversion_error(8, e))?
        .with_timezone(&Utc);

    Ok(JournalRecord {
        id: parse_uuid(row, 0)?,
        user_id: parse_uuid(row, 1)?,
        entry_text: row.get(2)?,
        analysis: MoodAnalysis {
            mood_score: row.get(3)?,
            mental_state,
            suggestions: parse_list(row, 5)?,
            habits: parse_list(row, 6)?,
            breathing_prompt: row.get(7)?,
        },
        created_at,
    })
}
