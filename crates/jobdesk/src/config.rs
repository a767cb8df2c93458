//! Runtime configuration for `jobdesk`.
//!
//! Values come from, in increasing precedence: built-in defaults, the TOML
//! config file, environment variables and command-line flags. The last two
//! are merged by clap before this module sees them.
//!
//! ```toml
//! # ~/.config/jobdesk/config.toml
//! base_url = "https://jobs.example.com"
//! timeout_secs = 20
//! page_size = 25
//! session_ttl_minutes = 180
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobsheet::table::PageSize;

use crate::cli::Cli;
use crate::session::{DEFAULT_TTL_HOURS, SessionError, SessionStore};

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:7000";

/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config file name inside the per-user config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors resolving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    PageSize(#[from] jobsheet::Error),

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error("session lifetime must be positive, got {0} minutes")]
    InvalidSessionTtl(i64),
}

/// Settings accepted in the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<usize>,
    pub session_file: Option<PathBuf>,
    pub session_ttl_minutes: Option<i64>,
}

impl FileConfig {
    /// Reads `path`. With `required` unset a missing file yields defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config dir>/config.toml` for the current user.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "jobdesk", "jobdesk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: PageSize,
    /// Explicit session file; the per-user data directory otherwise.
    pub session_file: Option<PathBuf>,
    pub session_ttl: chrono::Duration,
    pub color: bool,
    /// Overrides the current day, for reproducible ranges.
    pub today: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: PageSize::default(),
            session_file: None,
            session_ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
            color: true,
            today: None,
        }
    }
}

impl Config {
    /// Resolves the configuration for `cli`, reading the config file.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match (&cli.config, FileConfig::default_path()) {
            (Some(path), _) => FileConfig::load(path, true)?,
            (None, Some(path)) => FileConfig::load(&path, false)?,
            (None, None) => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Layers `cli` over `file` over the defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let page_size = match cli.page_size.or(file.page_size) {
            Some(n) => PageSize::try_from(n)?,
            None => defaults.page_size,
        };

        let session_ttl = match file.session_ttl_minutes {
            Some(minutes) if minutes <= 0 => return Err(ConfigError::InvalidSessionTtl(minutes)),
            Some(minutes) => chrono::Duration::minutes(minutes),
            None => defaults.session_ttl,
        };

        Ok(Self {
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(timeout_secs),
            page_size,
            session_file: cli.session_file.clone().or(file.session_file),
            session_ttl,
            color: !cli.no_color,
            today: cli.today,
        })
    }

    /// The session store these settings point at.
    pub fn session_store(&self) -> Result<SessionStore, SessionError> {
        let path = match &self.session_file {
            Some(path) => path.clone(),
            None => SessionStore::default_path()?,
        };
        Ok(SessionStore::new(path).with_ttl(self.session_ttl))
    }

    /// The reference day for ranges and new job sheets.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["jobdesk"];
        full.extend_from_slice(args);
        full.push("logout");
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_without_flags_or_file() {
        let config = Config::merge(&cli(&[]), FileConfig::default()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, PageSize::Fifteen);
        assert_eq!(config.session_ttl, chrono::Duration::hours(3));
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            base_url: Some("http://file".into()),
            timeout_secs: Some(5),
            page_size: Some(25),
            ..FileConfig::default()
        };
        let config = Config::merge(&cli(&["--base-url", "http://flag", "--page-size", "50"]), file)
            .unwrap();
        assert_eq!(config.base_url, "http://flag");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, PageSize::Fifty);
    }

    #[test]
    fn rejects_unsupported_page_size() {
        let err = Config::merge(&cli(&["--page-size", "20"]), FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::PageSize(jobsheet::Error::InvalidPageSize(20))));
    }

    #[test]
    fn rejects_zero_timeout_and_ttl() {
        assert!(matches!(
            Config::merge(&cli(&["--timeout-secs", "0"]), FileConfig::default()),
            Err(ConfigError::ZeroTimeout)
        ));
        let file = FileConfig {
            session_ttl_minutes: Some(0),
            ..FileConfig::default()
        };
        assert!(matches!(
            Config::merge(&cli(&[]), file),
            Err(ConfigError::InvalidSessionTtl(0))
        ));
    }

    #[test]
    fn loads_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"https://jobs.example.com\"\nsession_ttl_minutes = 60\n")
            .unwrap();
        let file = FileConfig::load(&path, true).unwrap();
        assert_eq!(file.base_url.as_deref(), Some("https://jobs.example.com"));
        let config = Config::merge(&cli(&[]), file).unwrap();
        assert_eq!(config.session_ttl, chrono::Duration::minutes(60));
    }

    #[test]
    fn missing_file_is_optional_only_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(FileConfig::load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "colour = true\n").unwrap();
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_session_file_wins() {
        let config = Config::merge(&cli(&["--session-file", "/tmp/s.json"]), FileConfig::default())
            .unwrap();
        let store = config.session_store().unwrap();
        assert_eq!(store.path(), Path::new("/tmp/s.json"));
    }
}
