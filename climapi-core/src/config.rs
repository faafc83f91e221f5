use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "CLIMAPI_API_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Settings a [`crate::WeatherServiceClient`] is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    /// Validate `base_url` and strip any trailing slash.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = base_url.into();
        let trimmed = raw.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self { base_url: trimmed.to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the base URL once at startup.
    ///
    /// Precedence: `explicit` (e.g. a CLI flag), then `CLIMAPI_API_URL`, then
    /// the config file, then [`DEFAULT_API_URL`].
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let env = std::env::var(API_URL_ENV).ok();
        Self::resolve_from(explicit, env.as_deref(), ConfigFile::load)
    }

    /// Same as [`ClientConfig::resolve`] with every source passed in.
    ///
    /// `load_file` only runs when neither `explicit` nor `env` holds a
    /// non-blank value, so a broken config file cannot mask an override.
    pub fn resolve_from<F>(
        explicit: Option<&str>,
        env: Option<&str>,
        load_file: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> Result<ConfigFile, ConfigError>,
    {
        if let Some(url) = first_non_blank([explicit, env]) {
            return Self::new(url);
        }

        let file = load_file()?;
        Self::new(first_non_blank([file.api_url.as_deref()]).unwrap_or(DEFAULT_API_URL))
    }
}

fn first_non_blank<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().map(str::trim).find(|s| !s.is_empty())
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string() }
    }
}

/// Configuration stored on disk.
///
/// Example TOML:
/// api_url = "https://climapi.example.com"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_url: Option<String>,
}

impl ConfigFile {
    /// Load config from the platform location, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;

        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "climapi", "climapi").ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Validate and store a base URL, returning the normalized form.
    pub fn set_api_url(&mut self, url: &str) -> Result<&str, ConfigError> {
        let config = ClientConfig::new(url)?;
        Ok(self.api_url.insert(config.base_url).as_str())
    }
}
