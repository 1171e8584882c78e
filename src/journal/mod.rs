//! Journal entry submission.
//!
//! This module turns raw text into a [`JournalEntryInput`], sends it for
//! analysis and stores the analysed entry for the signed-in user. It also
//! keeps an unsent entry as a draft so that a failed submission never loses
//! what the user wrote.

use crate::client::AnalysisClient;
use crate::db::entries::{insert_entry, JournalRecord};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::session::Session;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Raw journal text that is safe to submit.
///
/// # Examples
///
/// ```
/// use serenity::journal::JournalEntryInput;
///
/// let entry = JournalEntryInput::new("I had a wonderful productive day")?;
/// assert_eq!(entry.as_str(), "I had a wonderful productive day");
///
/// assert!(JournalEntryInput::new("   \n\t").is_err());
/// # Ok::<(), serenity::errors::AppError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryInput {
    text: String,
}

impl JournalEntryInput {
    /// Wraps `text`, rejecting empty or whitespace-only input.
    ///
    /// The text is kept as written; only the emptiness check trims it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Journal("Journal entry cannot be empty")`.
    pub fn new(text: impl Into<String>) -> AppResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::Journal(
                "Journal entry cannot be empty".to_string(),
            ));
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> String {
        self.text
    }
}

/// Analyses an entry and stores it for the session's user.
///
/// One request is made to the analysis service and nothing is retried. If
/// the insert fails after a successful analysis, the analysis is discarded.
///
/// # Errors
///
/// Returns the analysis or database error unchanged.
pub async fn submit_entry(
    db: &Database,
    session: &Session,
    client: &AnalysisClient,
    entry: &JournalEntryInput,
) -> AppResult<JournalRecord> {
    let analysis = client.analyze(entry).await?;

    let conn = db.get_conn()?;
    let record = insert_entry(&conn, session.user_id, entry.as_str(), &analysis)?;

    info!(
        "Saved entry {} ({}, score {})",
        record.id,
        record.analysis.mental_state,
        record.analysis.rounded_score()
    );
    Ok(record)
}

/// Stores unsent text so it can be resubmitted later.
pub fn save_draft(path: &Path, text: &str) -> AppResult<()> {
    fs::write(path, text)?;

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    debug!("Draft saved to {:?}", path);
    Ok(())
}

/// Reads the stored draft, if any.
pub fn load_draft(path: &Path) -> AppResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Removes the stored draft. A missing draft is not an error.
pub fn clear_draft(path: &Path) -> AppResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Draft cleared");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!("Failed to clear draft: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_input_rejects_blank_text() {
        for blank in ["", " ", "\n\n", "\t \r\n"] {
            match JournalEntryInput::new(blank) {
                Err(AppError::Journal(msg)) => assert_eq!(msg, "Journal entry cannot be empty"),
                other => panic!("Expected Journal error for {:?}, got {:?}", blank, other),
            }
        }
    }

    #[test]
    fn test_entry_input_keeps_text_verbatim() {
        let entry = JournalEntryInput::new("  Long day.\nBut good.  ").unwrap();
        assert_eq!(entry.as_str(), "  Long day.\nBut good.  ");
        assert_eq!(entry.into_inner(), "  Long day.\nBut good.  ");
    }

    #[test]
    fn test_entry_input_has_no_length_ceiling() {
        let text = "word ".repeat(50_000);
        assert!(JournalEntryInput::new(text).is_ok());
    }

    #[test]
    fn test_draft_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.txt");

        assert_eq!(load_draft(&path).unwrap(), None);

        save_draft(&path, "unfinished thoughts").unwrap();
        assert_eq!(
            load_draft(&path).unwrap().as_deref(),
            Some("unfinished thoughts")
        );

        clear_draft(&path).unwrap();
        assert_eq!(load_draft(&path).unwrap(), None);
        clear_draft(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_draft_is_owner_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.txt");
        save_draft(&path, "private").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
