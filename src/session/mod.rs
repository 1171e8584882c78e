//! Signed-in identity management.
//!
//! Components never read a global "current user". The caller obtains a
//! [`Session`] from the [`SessionStore`] once and passes it explicitly into every
//! operation that needs an identity. Components that must react to sign-in
//! or sign-out register a listener and hold the returned [`Subscription`];
//! dropping it, or calling [`Subscription::unsubscribe`], removes the listener.
//!
//! # Example
//!
//! ```no_run
//! use serenity::db::Database;
//! use serenity::session::{AuthEvent, SessionStore};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/serenity.db"))?;
//! db.initialize_schema()?;
//!
//! let store = SessionStore::new("/tmp/session.json");
//! let subscription = store.on_auth_state_change(|event, session| {
//!     println!("{:?}: {:?}", event, session.map(|s| &s.email));
//! });
//!
//! let session = store.sign_in(&db, "ada@example.com")?;
//! println!("Signed in as {}", session.email);
//!
//! subscription.unsubscribe();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::db::users::find_or_create_user;
use crate::db::Database;
use crate::errors::{AppResult, SessionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Change notifications delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

type Listener = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // A panicking listener must not disable auth notifications for everyone else.
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Persisted session plus the listener registry.
pub struct SessionStore {
    path: PathBuf,
    listeners: Arc<Mutex<Listeners>>,
}

impl SessionStore {
    /// Creates a store backed by the session file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the active session, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Corrupt` if the session file exists but cannot be decoded.
    pub fn current(&self) -> AppResult<Option<Session>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let session: Session = serde_json::from_str(&raw).map_err(SessionError::Corrupt)?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the active session or fails with "Not authenticated".
    pub fn require(&self) -> AppResult<Session> {
        self.current()?
            .ok_or_else(|| SessionError::NotAuthenticated.into())
    }

    /// Signs in `email`, creating the user on first use.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail` for an unusable address and
    /// database or I/O errors if the user or session cannot be stored.
    pub fn sign_in(&self, db: &Database, email: &str) -> AppResult<Session> {
        let email = normalize_email(email)?;

        let conn = db.get_conn()?;
        let user_id = find_or_create_user(&conn, &email)?;

        let session = Session {
            user_id,
            email,
            signed_in_at: Utc::now(),
        };

        let raw = serde_json::to_string_pretty(&session).map_err(SessionError::Corrupt)?;
        fs::write(&self.path, raw)?;

        #[cfg(unix)]
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;

        info!("Signed in as {}", session.email);
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    /// Ends the active session. Signing out without a session is a no-op
    /// apart from the notification.
    pub fn sign_out(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Signed out"),
            Err(e) if e.kind() == ErrorKind::NotFound => debug!("No session to sign out of"),
            Err(e) => return Err(e.into()),
        }
        self.notify(AuthEvent::SignedOut, None);
        Ok(())
    }

    /// Registers a listener for sign-in and sign-out.
    ///
    /// The listener stays registered for as long as the returned subscription lives.
    pub fn on_auth_state_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let mut guard = lock(&self.listeners);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.insert(id, Arc::new(listener));
        debug!("Registered auth listener {}", id);

        Subscription {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        // Listeners run unlocked so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = lock(&self.listeners).entries.values().cloned().collect();
        for listener in listeners {
            listener(event, session);
        }
    }
}

/// Handle to a registered auth listener.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    id: u64,
    listeners: Arc<Mutex<Listeners>>,
}

impl Subscription {
    /// Removes the listener.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if lock(&self.listeners).entries.remove(&self.id).is_some() {
            debug!("Removed auth listener {}", self.id);
        }
    }
}

/// Trims and lower-cases an email, rejecting obviously unusable values.
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(SessionError::InvalidEmail(raw.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database, SessionStore) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("test.db")).unwrap();
        db.initialize_schema().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"));
        (temp_dir, db, store)
    }

    #[test]
    fn test_no_session_initially() {
        let (_dir, _db, store) = setup();
        assert!(store.current().unwrap().is_none());
        match store.require() {
            Err(AppError::Session(SessionError::NotAuthenticated)) => {}
            other => panic!("Expected NotAuthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_sign_in_persists_and_reuses_user() {
        let (_dir, db, store) = setup();

        let first = store.sign_in(&db, "  Ada@Example.com ").unwrap();
        assert_eq!(first.email, "ada@example.com");
        assert_eq!(store.require().unwrap(), first);

        store.sign_out().unwrap();
        assert!(store.current().unwrap().is_none());

        let second = store.sign_in(&db, "ada@example.com").unwrap();
        assert_eq!(first.user_id, second.user_id);
    }

    #[test]
    fn test_sign_out_without_session_is_ok() {
        let (_dir, _db, store) = setup();
        assert!(store.sign_out().is_ok());
    }

    #[test]
    fn test_corrupt_session_file() {
        let (_dir, _db, store) = setup();
        fs::write(store.path(), "{not json").unwrap();
        match store.current() {
            Err(AppError::Session(SessionError::Corrupt(_))) => {}
            other => panic!("Expected Corrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_listeners_notified_until_unsubscribed() {
        let (_dir, db, store) = setup();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = store.on_auth_state_change(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.listener_count(), 1);

        store.sign_in(&db, "ada@example.com").unwrap();
        store.sign_out().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        subscription.unsubscribe();
        assert_eq!(store.listener_count(), 0);

        store.sign_in(&db, "ada@example.com").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_receives_event_and_session() {
        let (_dir, db, store) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _subscription = store.on_auth_state_change(move |event, session| {
            sink.lock()
                .unwrap()
                .push((event, session.map(|s| s.email.clone())));
        });

        store.sign_in(&db, "grace@example.com").unwrap();
        store.sign_out().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (AuthEvent::SignedIn, Some("grace@example.com".to_string())),
                (AuthEvent::SignedOut, None),
            ]
        );
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let (_dir, db, store) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&calls);
        let own = Arc::clone(&slot);
        let subscription = store.on_auth_state_change(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let taken = own.lock().unwrap().take();
            drop(taken);
        });
        *slot.lock().unwrap() = Some(subscription);

        store.sign_in(&db, "ada@example.com").unwrap();
        assert_eq!(store.listener_count(), 0);

        store.sign_out().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        let (_dir, db, store) = setup();
        store.sign_in(&db, "ada@example.com").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.io ").unwrap(), "a@b.io");
        for bad in ["", "no-at-sign", "@domain", "local@", "a@b@c", "a b@c.d"] {
            assert!(normalize_email(bad).is_err(), "'{}' should be rejected", bad);
        }
    }
}
