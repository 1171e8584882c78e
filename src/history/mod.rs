//! Recent mood history for the signed-in user.

use crate::db::entries::{recent_entries, JournalRecord};
use crate::db::Database;
use crate::errors::AppResult;
use crate::session::Session;
use tracing::debug;

/// The most recent entries of a user and their average mood.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodHistory {
    /// Newest first.
    pub entries: Vec<JournalRecord>,
    /// Mean mood score rounded to the nearest integer; `None` when empty.
    pub average_score: Option<i64>,
}

impl MoodHistory {
    pub fn from_entries(entries: Vec<JournalRecord>) -> Self {
        let average_score = average_score(&entries);
        Self {
            entries,
            average_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the `limit` most recent entries of the session's user.
pub fn load_history(db: &Database, session: &Session, limit: usize) -> AppResult<MoodHistory> {
    let conn = db.get_conn()?;
    let entries = recent_entries(&conn, session.user_id, limit)?;
    debug!("Loaded {} history entries", entries.len());
    Ok(MoodHistory::from_entries(entries))
}

fn average_score(entries: &[JournalRecord]) -> Option<i64> {
    if entries.is_empty() {
        return None;
    }
    let total: f64 = entries.iter().map(|e| e.analysis.mood_score).sum();
    Some((total / entries.len() as f64).round() as i64)
}
