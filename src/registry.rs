//! Favorite and download registries
//!
//! Deduplicated, most-recent-first collections of wallpaper records,
//! persisted as JSON. Both registries survive restarts; mutations are
//! synchronous and atomic from the caller's point of view, persistence
//! is an explicit `save` driven by the session.

use crate::error::Result;
use crate::types::{WallpaperRecord, WallpaperSource};
use crate::util::unix_now;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A favorited wallpaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub record: WallpaperRecord,
    /// Unix seconds when the favorite was added.
    pub liked_at: u64,
}

/// A downloaded wallpaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadEntry {
    pub record: WallpaperRecord,
    /// Where the host stored the file. Always present and kept in sync
    /// with `record.local_path`.
    pub local_path: PathBuf,
    /// Unix seconds of the first download; re-downloads keep it.
    pub downloaded_at: u64,
}

/// Favorites registry: toggle semantics, newest first.
#[derive(Debug)]
pub struct Favorites {
    entries: Vec<FavoriteEntry>,
    path: PathBuf,
}

impl Favorites {
    pub fn new(path: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            path,
        }
    }

    /// Load the registry, starting empty if the file does not exist yet.
    pub fn load(path: PathBuf) -> Result<Self> {
        let entries = load_entries(&path)?;
        Ok(Self { entries, path })
    }

    pub fn save(&self) -> Result<()> {
        save_entries(&self.path, &self.entries)
    }

    /// Toggle membership for a record. Returns the resulting state:
    /// `true` if the record is now a favorite.
    pub fn toggle(&mut self, record: WallpaperRecord) -> bool {
        if let Some(pos) = self.entries.iter().position(|e| e.record.id == record.id) {
            self.entries.remove(pos);
            false
        } else {
            self.entries.insert(
                0,
                FavoriteEntry {
                    record,
                    liked_at: unix_now(),
                },
            );
            true
        }
    }

    /// Remove by id; no-op if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.record.id != id);
        self.entries.len() < before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.record.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|e| e.record.id == id)
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Downloads registry: add-or-update semantics, newest first.
#[derive(Debug)]
pub struct Downloads {
    entries: Vec<DownloadEntry>,
    path: PathBuf,
}

impl Downloads {
    pub fn new(path: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            path,
        }
    }

    /// Load the registry, starting empty if the file does not exist yet.
    pub fn load(path: PathBuf) -> Result<Self> {
        let entries = load_entries(&path)?;
        Ok(Self { entries, path })
    }

    pub fn save(&self) -> Result<()> {
        save_entries(&self.path, &self.entries)
    }

    /// Record a completed download.
    ///
    /// A re-download of a known id replaces `local_path` in place and
    /// keeps the entry's position and original `downloaded_at`; a new id
    /// is prepended and stamped now.
    pub fn add(&mut self, mut record: WallpaperRecord, local_path: PathBuf) {
        record.local_path = Some(local_path.clone());
        record.cached = true;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.record.id == record.id) {
            entry.local_path = local_path.clone();
            entry.record.local_path = Some(local_path);
            entry.record.cached = true;
        } else {
            self.entries.insert(
                0,
                DownloadEntry {
                    record,
                    local_path,
                    downloaded_at: unix_now(),
                },
            );
        }
    }

    /// Remove by id; no-op if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.record.id != id);
        self.entries.len() < before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.record.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&DownloadEntry> {
        self.entries.iter().find(|e| e.record.id == id)
    }

    pub fn local_path(&self, id: &str) -> Option<&Path> {
        self.get(id).map(|e| e.local_path.as_path())
    }

    pub fn entries(&self) -> &[DownloadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backfill entries for files the host reports but the registry has
    /// never seen (for example downloads made before the registry file
    /// existed). Known ids are left exactly as they are.
    pub fn sync_from_host(&mut self, listed: Vec<(String, PathBuf)>) {
        for (id, path) in listed {
            if self.contains(&id) {
                continue;
            }
            let record = WallpaperRecord {
                title: format!("Downloaded wallpaper {id}"),
                url: format!("file://{}", path.display()),
                id,
                source: WallpaperSource::Bing,
                local_path: Some(path.clone()),
                cached: true,
            };
            self.entries.insert(
                0,
                DownloadEntry {
                    record,
                    local_path: path,
                    downloaded_at: unix_now(),
                },
            );
        }
    }
}

fn load_entries<E: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<E>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_entries<E: Serialize>(path: &Path, entries: &[E]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)?;
    Ok(())
}
