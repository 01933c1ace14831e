//! The CLI remembers the bearer token from `auth signin` in a small JSON
//! file so later commands can authenticate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bookmarket::config;
use bookmarket::dto::AuthResponseDto;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SESSION_FILE_NAME: &str = "session.json";

/// What is stored between CLI invocations
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&AuthResponseDto> for StoredSession {
    fn from(response: &AuthResponseDto) -> Self {
        Self {
            token: response.token.clone(),
            user_id: response.user.get_id(),
            username: response.user.get_username(),
            expires_at: response.expires_at,
        }
    }
}

/// The default session file, in the platform data directory
pub fn default_session_path() -> Option<PathBuf> {
    config::get_data_dir_path().map(|dir| dir.join(SESSION_FILE_NAME))
}

/// Reads the stored session, ignoring missing, unreadable and expired ones
pub fn load(path: &Path) -> Option<StoredSession> {
    let contents = fs::read_to_string(path).ok()?;
    let session: StoredSession = serde_json::from_str(&contents).ok()?;
    (session.expires_at > Utc::now()).then_some(session)
}

/// Writes the session, creating the parent directory if needed
pub fn save(path: &Path, session: &StoredSession) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Forgets the stored session; a missing file is not an error
pub fn clear(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn session(expires_at: DateTime<Utc>) -> StoredSession {
        StoredSession {
            token: "abc123".to_string(),
            user_id: "user-1".to_string(),
            username: "reader".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE_NAME);
        let stored = session(Utc::now() + Duration::hours(1));

        save(&path, &stored).unwrap();

        assert_eq!(load(&path), Some(stored));
    }

    #[test]
    fn test_load_ignores_expired_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        save(&path, &session(Utc::now() - Duration::minutes(1))).unwrap();

        assert_eq!(load(&path), None);
    }

    #[test]
    fn test_load_ignores_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        assert_eq!(load(&path), None);
        assert_eq!(load(&dir.path().join("missing.json")), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        save(&path, &session(Utc::now() + Duration::hours(1))).unwrap();

        clear(&path).unwrap();
        assert!(!path.exists());
        clear(&path).unwrap();
    }
}
