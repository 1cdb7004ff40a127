#![allow(dead_code)]

//! Scriptable in-memory host used by the integration tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use wallmate::{
    AutoSwitchSettings, Host, PaginatedResponse, Result, WallpaperError, WallpaperListItem,
    WallpaperRecord, WallpaperSource,
};

/// Counts every call, answers with synthetic data, and can be told to
/// fail or refuse specific operations.
#[derive(Default)]
pub struct MockHost {
    pub fetch_next_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub set_wallpaper_calls: AtomicUsize,
    pub fail_fetch_next: AtomicBool,
    pub refuse_delete: AtomicBool,
    pub auto_switch: Mutex<HashMap<WallpaperSource, AutoSwitchSettings>>,
    pub host_files: Mutex<Vec<(String, PathBuf)>>,
    pub revealed: Mutex<Vec<PathBuf>>,
    /// How many pages each source pretends to have.
    pub last_page: u32,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            last_page: 3,
            ..Self::default()
        }
    }

    pub fn stored_auto_switch(&self, source: WallpaperSource) -> Option<AutoSwitchSettings> {
        self.auto_switch
            .lock()
            .expect("mock lock poisoned")
            .get(&source)
            .copied()
    }

    pub fn fetch_next_count(&self) -> usize {
        self.fetch_next_calls.load(Ordering::SeqCst)
    }

    pub fn set_wallpaper_count(&self) -> usize {
        self.set_wallpaper_calls.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl Host for MockHost {
    async fn fetch_next_wallpaper(
        &self,
        source: WallpaperSource,
        _api_key: Option<String>,
    ) -> Result<WallpaperRecord> {
        let n = self.fetch_next_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_fetch_next.load(Ordering::SeqCst) {
            return Err(WallpaperError::Host("provider unavailable".into()));
        }
        Ok(WallpaperRecord {
            id: format!("{source}-next-{n}"),
            title: format!("Next wallpaper {n}"),
            url: format!("https://example.com/{source}/{n}.jpg"),
            source,
            local_path: Some(PathBuf::from(format!("/tmp/mock/{source}-{n}.jpg"))),
            cached: true,
        })
    }

    async fn fetch_wallpapers_list(
        &self,
        source: WallpaperSource,
        page: u32,
        _api_key: Option<String>,
    ) -> Result<PaginatedResponse<WallpaperListItem>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let data = (0..2)
            .map(|i| WallpaperListItem {
                id: format!("{source}-p{page}-{i}"),
                title: format!("{source} page {page} item {i}"),
                url: format!("https://example.com/{source}/p{page}/{i}.jpg"),
                thumb_url: format!("https://example.com/{source}/p{page}/{i}.th.jpg"),
                source,
            })
            .collect();
        Ok(PaginatedResponse {
            data,
            current_page: page,
            last_page: self.last_page,
            per_page: 2,
            total: self.last_page * 2,
        })
    }

    async fn download_wallpaper(&self, record: &WallpaperRecord) -> Result<PathBuf> {
        let n = self.download_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let path = PathBuf::from(format!("/tmp/mock/{}-v{n}.jpg", record.id));
        self.host_files
            .lock()
            .expect("mock lock poisoned")
            .push((record.id.clone(), path.clone()));
        Ok(path)
    }

    async fn set_wallpaper(&self, _record: &WallpaperRecord) -> Result<()> {
        self.set_wallpaper_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_auto_switch_config(
        &self,
        source: WallpaperSource,
        enabled: bool,
        interval_seconds: u64,
    ) -> Result<()> {
        self.auto_switch.lock().expect("mock lock poisoned").insert(
            source,
            AutoSwitchSettings {
                enabled,
                interval_seconds,
            },
        );
        Ok(())
    }

    async fn get_auto_switch_config(
        &self,
        source: WallpaperSource,
    ) -> Result<Option<AutoSwitchSettings>> {
        Ok(self.stored_auto_switch(source))
    }

    async fn list_downloads(&self) -> Result<Vec<(String, PathBuf)>> {
        Ok(self.host_files.lock().expect("mock lock poisoned").clone())
    }

    async fn delete_download(&self, id: &str) -> Result<bool> {
        if self.refuse_delete.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut files = self.host_files.lock().expect("mock lock poisoned");
        let before = files.len();
        files.retain(|(file_id, _)| file_id != id);
        Ok(files.len() < before)
    }

    async fn reveal_in_file_browser(&self, path: &Path) -> Result<()> {
        self.revealed
            .lock()
            .expect("mock lock poisoned")
            .push(path.to_path_buf());
        Ok(())
    }
}
