//! Persisted client settings
//!
//! The slice of session state that survives restarts: which source each
//! view last used, the preferred auto-switch interval, and the opaque
//! Wallhaven API key. Stored as TOML; a missing or corrupt file falls
//! back to defaults so the client always starts.

use crate::error::Result;
use crate::types::WallpaperSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Source driving the "next wallpaper" view.
    #[serde(default = "default_source")]
    pub random_source: WallpaperSource,
    /// Source driving the listing/browse view.
    #[serde(default = "default_source")]
    pub list_source: WallpaperSource,
    /// Preferred auto-switch interval in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Opaque credential passed through to the host for Wallhaven calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallhaven_api_key: Option<String>,
}

fn default_source() -> WallpaperSource {
    WallpaperSource::Bing
}

fn default_interval() -> u64 {
    3600
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            random_source: default_source(),
            list_source: default_source(),
            interval_seconds: default_interval(),
            wallhaven_api_key: None,
        }
    }
}

impl ClientConfig {
    /// Platform default config file location.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "wallmate", "wallmate")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or unreadable as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)?;
        match toml::from_str::<ClientConfig>(&data) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %path.display(), "unparseable config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// API key to hand the host for a given source. Only Wallhaven
    /// takes a key; an empty string counts as unset.
    pub fn api_key_for(&self, source: WallpaperSource) -> Option<String> {
        match source {
            WallpaperSource::Wallhaven => self
                .wallhaven_api_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }
}
