//! The persisted login: a JSON file that expires a fixed time after sign-in.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use jobsheet::session::{AppContext, Session};

/// How long a login stays valid.
pub const DEFAULT_TTL_HOURS: i64 = 3;

/// File name inside the per-user data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Errors reading or writing the session file.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session file exists.
    #[error("not logged in, run `jobdesk login` first")]
    NotLoggedIn,

    /// The session file exists but its lifetime is over.
    #[error("session expired at {0}, run `jobdesk login` again")]
    Expired(DateTime<Utc>),

    /// The file could not be read or written.
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a session record.
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No per-user data directory could be determined.
    #[error("cannot determine a data directory; set JOBDESK_SESSION_FILE")]
    NoDataDir,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// `<data dir>/session.json` for the current user.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        ProjectDirs::from("com", "jobdesk", "jobdesk")
            .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
            .ok_or(SessionError::NoDataDir)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `session`, valid until `now + ttl`. Returns the expiry.
    pub fn save(&self, session: &Session, now: DateTime<Utc>) -> Result<DateTime<Utc>, SessionError> {
        let expires_at = now + self.ttl;
        let stored = StoredSession {
            session: session.clone(),
            expires_at,
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| self.io(source))?;

        // The temp file is created owner-only and renamed over the old one.
        let mut file = NamedTempFile::new_in(dir).map_err(|source| self.io(source))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|source| self.io(source))?;
        file.persist(&self.path).map_err(|err| self.io(err.error))?;

        tracing::debug!(path = %self.path.display(), %expires_at, "session saved");
        Ok(expires_at)
    }

    /// Loads the session as an application context, if still valid at `now`.
    pub fn load(&self, now: DateTime<Utc>) -> Result<AppContext, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SessionError::NotLoggedIn),
            Err(source) => return Err(self.io(source)),
        };
        let stored: StoredSession =
            serde_json::from_str(&text).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if now >= stored.expires_at {
            tracing::info!(expired_at = %stored.expires_at, "session expired");
            return Err(SessionError::Expired(stored.expires_at));
        }
        Ok(AppContext::from_login(stored.session))
    }

    /// Removes the session file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io(source)),
        }
    }

    fn io(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            jwt_token: "tok".into(),
            user_id: "7".into(),
            user_name: "asha".into(),
            name: "Asha".into(),
            position: "ADMIN".into(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn save_then_load_within_ttl() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("nested/session.json"));
        let expires = store.save(&session(), noon()).unwrap();
        assert_eq!(expires, noon() + Duration::hours(3));

        let ctx = store.load(noon() + Duration::minutes(179)).unwrap();
        assert_eq!(ctx.token(), "tok");
        assert!(ctx.is_admin());
    }

    #[test]
    fn expires_after_ttl() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session(), noon()).unwrap();
        assert!(matches!(
            store.load(noon() + Duration::hours(3)),
            Err(SessionError::Expired(_))
        ));
    }

    #[test]
    fn missing_file_is_not_logged_in() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(matches!(store.load(noon()), Err(SessionError::NotLoggedIn)));
        store.clear().unwrap();
    }

    #[test]
    fn clear_logs_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session(), noon()).unwrap();
        store.clear().unwrap();
        assert!(matches!(store.load(noon()), Err(SessionError::NotLoggedIn)));
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let err = SessionStore::new(&path).load(noon()).unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
        assert!(err.to_string().contains("corrupt"));
    }

    #[cfg(unix)]
    #[test]
    fn save_over_world_readable_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        SessionStore::new(&path).save(&session(), noon()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn resave_replaces_whole_file() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session(), noon()).unwrap();
        let mut other = session();
        other.jwt_token = "tok-2".into();
        store.save(&other, noon()).unwrap();

        assert_eq!(store.load(noon()).unwrap().token(), "tok-2");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn interrupted_save_keeps_previous_session() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session(), noon()).unwrap();

        // A writer that dies before the rename only ever touched its temp file.
        let mut partial = NamedTempFile::new_in(dir.path()).unwrap();
        partial.write_all(br#"{"session":{"jwtTo"#).unwrap();
        drop(partial);

        assert_eq!(store.load(noon()).unwrap().token(), "tok");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn custom_ttl() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("s.json")).with_ttl(Duration::minutes(5));
        store.save(&session(), noon()).unwrap();
        assert!(store.load(noon() + Duration::minutes(4)).is_ok());
        assert!(store.load(noon() + Duration::minutes(5)).is_err());
    }
}
