use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::attempt::FinishPolicy;

const APP_NAME: &str = "quiz-attempt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write config {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub tick_interval_ms: u64,
    pub finish_policy: FinishPolicy,
    pub request_timeout_secs: u64,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            auth_token: None,
            tick_interval_ms: 1000,
            finish_policy: FinishPolicy::RequireSelection,
            request_timeout_secs: 30,
            log_path: None,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Where the log file goes when none is configured.
    pub fn resolved_log_path(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(|| {
            ProjectDirs::from("", "", APP_NAME)
                .map(|dirs| dirs.data_local_dir().join("quiz-attempt.log"))
                .unwrap_or_else(|| PathBuf::from("quiz-attempt.log"))
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quiz_attempt_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file. `Ok(None)` when there is no file yet.
    pub fn try_load(&self) -> Result<Option<Config>, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Decode {
                path: self.path.clone(),
                source,
            })
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// A missing or unreadable file yields the defaults.
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg.unwrap_or_default(),
            Err(err) => {
                log::warn!("ignoring {}", err);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested/deeper/config.json"));
        let cfg = Config {
            api_base_url: "https://lms.example.com/api".into(),
            auth_token: Some("token".into()),
            tick_interval_ms: 250,
            finish_policy: FinishPolicy::AllowUnanswered,
            request_timeout_secs: 5,
            log_path: Some(dir.path().join("q.log")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"finish_policy": "allow_unanswered"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.finish_policy, FinishPolicy::AllowUnanswered);
        assert_eq!(cfg.tick_interval_ms, 1000);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn test_try_load_reports_problems() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.try_load(), Ok(None));

        fs::write(&path, "not json").unwrap();
        assert_matches!(store.try_load(), Err(ConfigError::Decode { path: ref p, .. }) if *p == path);

        store.save(&Config::default()).unwrap();
        assert_matches!(store.try_load(), Ok(Some(cfg)) if cfg == Config::default());
    }

    #[test]
    fn test_durations_never_zero() {
        let cfg = Config {
            tick_interval_ms: 0,
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(cfg.tick_interval(), Duration::from_millis(1));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }
}
