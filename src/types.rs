//! Core wallpaper data model
//!
//! Wire-compatible shapes shared between the client state layer and the
//! host application. Field names serialize in camelCase because that is
//! what the host speaks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Upstream wallpaper provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperSource {
    Bing,
    Wallhaven,
    Unsplash,
    Pixabay,
    Pexels,
    Reddit,
}

impl WallpaperSource {
    /// All known sources, in display order.
    pub const ALL: [WallpaperSource; 6] = [
        WallpaperSource::Bing,
        WallpaperSource::Wallhaven,
        WallpaperSource::Unsplash,
        WallpaperSource::Pixabay,
        WallpaperSource::Pexels,
        WallpaperSource::Reddit,
    ];

    /// Parse the lowercase identifier used on the wire and in config files.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bing" => Some(WallpaperSource::Bing),
            "wallhaven" => Some(WallpaperSource::Wallhaven),
            "unsplash" => Some(WallpaperSource::Unsplash),
            "pixabay" => Some(WallpaperSource::Pixabay),
            "pexels" => Some(WallpaperSource::Pexels),
            "reddit" => Some(WallpaperSource::Reddit),
            _ => None,
        }
    }

    /// Wire identifier (also the config-file spelling).
    pub fn name(&self) -> &'static str {
        match self {
            WallpaperSource::Bing => "bing",
            WallpaperSource::Wallhaven => "wallhaven",
            WallpaperSource::Unsplash => "unsplash",
            WallpaperSource::Pixabay => "pixabay",
            WallpaperSource::Pexels => "pexels",
            WallpaperSource::Reddit => "reddit",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            WallpaperSource::Bing => "Bing Daily",
            WallpaperSource::Wallhaven => "Wallhaven",
            WallpaperSource::Unsplash => "Unsplash",
            WallpaperSource::Pixabay => "Pixabay",
            WallpaperSource::Pexels => "Pexels",
            WallpaperSource::Reddit => "Reddit",
        }
    }

    /// Whether the provider serves more than a single page of results.
    /// Only Wallhaven exposes a real pager; the rest are daily/curated
    /// feeds that always answer with page 1.
    pub fn supports_pagination(&self) -> bool {
        matches!(self, WallpaperSource::Wallhaven)
    }
}

impl fmt::Display for WallpaperSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single wallpaper as the host reports it.
///
/// Immutable once fetched, except that `local_path` and `cached` are set
/// exactly once when a download completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperRecord {
    /// Source-qualified identifier, unique across providers.
    pub id: String,
    pub title: String,
    /// Full-resolution remote URL.
    pub url: String,
    pub source: WallpaperSource,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub cached: bool,
}

/// A listing entry: a record plus the thumbnail the grid renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperListItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumb_url: String,
    pub source: WallpaperSource,
}

impl WallpaperListItem {
    /// The not-yet-downloaded record for preview/favorite/download flows.
    pub fn to_record(&self) -> WallpaperRecord {
        WallpaperRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            source: self.source,
            local_path: None,
            cached: false,
        }
    }
}

/// One page of paginated listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u32,
}

/// Per-source auto-switch configuration as the host persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSwitchSettings {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for AutoSwitchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 3600,
        }
    }
}
