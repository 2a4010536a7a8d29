use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::message::DEFAULT_HISTORY_LIMIT;
use crate::protocol::QueryMode;
use crate::validation;

// Default configuration
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Environment variable that overrides `backend_url`
pub const BACKEND_URL_ENV: &str = "SCHOLAR_BACKEND_URL";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub mode: QueryMode,
    pub history_limit: usize,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            mode: QueryMode::Fast,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load the saved settings, falling back to defaults when there are none
    /// or the file cannot be used.
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(settings_path().as_deref())
    }

    pub fn load_or_default_from(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => match load_settings_from(path) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            self.set_backend_url(&url)?;
        }
        Ok(())
    }

    pub fn set_backend_url(&mut self, url: &str) -> Result<()> {
        self.backend_url = validation::validate_backend_url(url)
            .map_err(|e| ClientError::Config(format!("{}: {}", url.trim(), e)))?;
        Ok(())
    }

    /// Reject values that would make the client unusable
    pub fn validate(&self) -> Result<()> {
        validation::validate_backend_url(&self.backend_url)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "scholar-chat", "scholar-chat")
        .map(|proj| proj.config_dir().join("settings.json"))
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&content)?;
    Ok(settings)
}

/// Save to the platform config directory and return the file written
pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let path = settings_path()
        .ok_or_else(|| ClientError::Config("Failed to determine config directory".to_string()))?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}
