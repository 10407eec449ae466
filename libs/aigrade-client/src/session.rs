// Session context: token, cached user and normalized role
//
// Begins on successful login, ends on logout. Persisted as JSON so separate
// CLI invocations share it. No cross-process locking: the last writer wins.

use aigrade_common::types::{LocalRole, User};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to write session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub role: Option<LocalRole>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            path: None,
        }
    }

    /// Session backed by `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_state(&path);
        Self {
            state: Arc::new(RwLock::new(state)),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn role(&self) -> Option<LocalRole> {
        self.read().role
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().token.as_deref().map_or(false, |t| !t.is_empty())
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Start a session after login. Memory is updated even if persisting fails.
    pub fn begin(&self, token: String, user: User) -> Result<(), SessionError> {
        let snapshot = {
            let mut state = self.write();
            state.role = Some(user.role.normalized());
            state.token = Some(token);
            state.user = Some(user);
            state.clone()
        };
        debug!(role = ?snapshot.role, "Session started");
        self.persist(&snapshot)
    }

    /// Replace the cached user, keeping the token
    pub fn update_user(&self, user: User) -> Result<(), SessionError> {
        let snapshot = {
            let mut state = self.write();
            state.role = Some(user.role.normalized());
            state.user = Some(user);
            state.clone()
        };
        self.persist(&snapshot)
    }

    /// Clear token, user and role
    pub fn end(&self) -> Result<(), SessionError> {
        let snapshot = {
            let mut state = self.write();
            *state = SessionState::default();
            state.clone()
        };
        debug!("Session ended");
        self.persist(&snapshot)
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_err = |source| SessionError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_vec_pretty(state)?;
        let mut file = open_private(path).map_err(io_err)?;
        file.write_all(&content).map_err(io_err)?;
        Ok(())
    }
}

fn load_state(path: &Path) -> SessionState {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return SessionState::default(),
    };

    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            SessionState::default()
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigrade_common::types::Role;

    fn user(role: Role) -> User {
        User {
            id: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            role,
            email_verified: true,
        }
    }

    #[test]
    fn test_begin_and_end_lifecycle() {
        let session = SessionStore::in_memory();
        assert!(!session.is_logged_in());

        session.begin("tok".to_string(), user(Role::Student)).unwrap();
        assert!(session.is_logged_in());
        assert_eq!(session.token().as_deref(), Some("tok"));
        assert_eq!(session.role(), Some(LocalRole::Student));

        session.end().unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session.user(), None);
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let session = SessionStore::open(&path);
        session.begin("tok".to_string(), user(Role::Admin)).unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("tok"));
        assert_eq!(reopened.role(), Some(LocalRole::Teacher));
        assert_eq!(reopened.user().unwrap().email, "ada@example.com");

        reopened.end().unwrap();
        assert!(!SessionStore::open(&path).is_logged_in());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ definitely not json").unwrap();

        let session = SessionStore::open(&path);
        assert_eq!(session.snapshot(), SessionState::default());
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionStore::in_memory();
        let handle = session.clone();
        session.begin("tok".to_string(), user(Role::Teacher)).unwrap();
        assert_eq!(handle.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_update_user_keeps_token() {
        let session = SessionStore::in_memory();
        session.begin("tok".to_string(), user(Role::Student)).unwrap();

        let mut renamed = user(Role::Student);
        renamed.first_name = "Augusta".to_string();
        session.update_user(renamed).unwrap();

        assert_eq!(session.token().as_deref(), Some("tok"));
        assert_eq!(session.user().unwrap().first_name, "Augusta");
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionStore::open(&path)
            .begin("tok".to_string(), user(Role::Student))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
