use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::editor::{Language, Theme};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub default_language: Language,
    pub theme: Theme,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: Option<u64>,
    pub request_timeout_secs: u64,
    pub resubmit_cooldown_secs: u64,
    pub reject_blank_code: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            session_cookie: None,
            default_language: Language::Python,
            theme: Theme::VsDark,
            poll_interval_ms: 2000,
            poll_timeout_secs: None,
            request_timeout_secs: 30,
            resubmit_cooldown_secs: 10,
            reject_blank_code: true,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resubmit_cooldown(&self) -> Duration {
        Duration::from_secs(self.resubmit_cooldown_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "judgeterm") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("judgeterm_config.json")
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
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "ignoring malformed config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"base_url": "https://judge.example", "theme": "hc-black"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.base_url, "https://judge.example");
        assert_eq!(cfg.theme, Theme::HcBlack);
        assert_eq!(cfg.poll_interval_ms, 2000);
        assert!(cfg.reject_blank_code);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            base_url: "https://judge.example".into(),
            session_cookie: Some("abc".into()),
            default_language: Language::Cpp,
            theme: Theme::Vs,
            poll_interval_ms: 500,
            poll_timeout_secs: Some(120),
            request_timeout_secs: 5,
            resubmit_cooldown_secs: 0,
            reject_blank_code: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn durations_follow_fields() {
        let cfg = Config {
            poll_timeout_secs: Some(3),
            ..Config::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(2000));
        assert_eq!(cfg.poll_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(cfg.resubmit_cooldown(), Duration::from_secs(10));
    }
}
