//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! API location, where the session is kept, and the last used username.
//!
//! Configuration is stored at `~/.config/givetrack/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::REQUEST_TIMEOUT_SECS;
use crate::auth::{FileSessionStore, KeyringSessionStore, SessionStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "givetrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the environment nor the config names one
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "GIVETRACK_API_URL";

/// Where the session tokens are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API base URL: environment first, then config, then the default
    pub fn api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }

    /// Durable session storage selected by `session_backend`
    pub fn session_store(&self) -> Result<Box<dyn SessionStore>> {
        Ok(match self.session_backend {
            SessionBackend::File => Box::new(FileSessionStore::new(self.cache_dir()?)),
            SessionBackend::Keyring => Box::new(KeyringSessionStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.json")).expect("load");
        assert_eq!(config.session_backend, SessionBackend::File);
        assert_eq!(config.request_timeout(), Duration::from_secs(REQUEST_TIMEOUT_SECS));
        assert_eq!(config.resolve_api_url(None), DEFAULT_API_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            api_base_url: Some("https://donate.example.org/api/".to_string()),
            last_username: Some("asha".to_string()),
            session_backend: SessionBackend::Keyring,
            request_timeout_secs: Some(10),
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.last_username.as_deref(), Some("asha"));
        assert_eq!(loaded.session_backend, SessionBackend::Keyring);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(10));

        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"keyring\""));
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_base_url: Some("https://config.example.org/api/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_url(Some("https://env.example.org/".to_string())),
            "https://env.example.org/"
        );
        assert_eq!(
            config.resolve_api_url(Some("  ".to_string())),
            "https://config.example.org/api/"
        );
        assert_eq!(config.resolve_api_url(None), "https://config.example.org/api/");
    }
}
