//! Contract with the host application
//!
//! The client core never talks to the network providers or the OS
//! directly; it calls into the host through [`Host`] and receives
//! asynchronous push notifications as [`HostEvent`]s. Implementations
//! live in the embedding application (and in the test suite).

use crate::error::Result;
use crate::types::{
    AutoSwitchSettings, PaginatedResponse, WallpaperListItem, WallpaperRecord, WallpaperSource,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Buffered capacity for host push notifications.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outbound request/response calls into the host application.
///
/// Methods return `impl Future + Send` so the auto-switch scheduler can
/// drive a shared `Arc<H>` from spawned timer tasks.
pub trait Host: Send + Sync + 'static {
    /// Pick, download and cache the next wallpaper for a source.
    fn fetch_next_wallpaper(
        &self,
        source: WallpaperSource,
        api_key: Option<String>,
    ) -> impl Future<Output = Result<WallpaperRecord>> + Send;

    /// Fetch one page of listing results for a source.
    fn fetch_wallpapers_list(
        &self,
        source: WallpaperSource,
        page: u32,
        api_key: Option<String>,
    ) -> impl Future<Output = Result<PaginatedResponse<WallpaperListItem>>> + Send;

    /// Download a wallpaper to local storage, returning its path.
    fn download_wallpaper(
        &self,
        record: &WallpaperRecord,
    ) -> impl Future<Output = Result<PathBuf>> + Send;

    /// Set the OS desktop wallpaper from a record (downloading first if
    /// it has no local path yet).
    fn set_wallpaper(&self, record: &WallpaperRecord) -> impl Future<Output = Result<()>> + Send;

    /// Persist the auto-switch configuration for a source.
    fn set_auto_switch_config(
        &self,
        source: WallpaperSource,
        enabled: bool,
        interval_seconds: u64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read back the stored auto-switch configuration for a source.
    fn get_auto_switch_config(
        &self,
        source: WallpaperSource,
    ) -> impl Future<Output = Result<Option<AutoSwitchSettings>>> + Send;

    /// Enumerate downloaded wallpapers as `(id, path)` pairs.
    fn list_downloads(&self) -> impl Future<Output = Result<Vec<(String, PathBuf)>>> + Send;

    /// Delete a downloaded file by id. Returns whether anything was removed.
    fn delete_download(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Show a downloaded file in the platform file browser.
    fn reveal_in_file_browser(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Push notifications from the host.
///
/// Delivery order is not guaranteed relative to outbound calls already
/// in flight, so reactions must be idempotent (see
/// [`Session::apply_event`](crate::session::Session::apply_event)).
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A wallpaper was fetched and cached (manual or scheduled).
    WallpaperFetched(WallpaperRecord),
    /// The OS wallpaper was changed to the given file.
    WallpaperSet(PathBuf),
}

/// Create the broadcast channel a host implementation publishes events
/// on. The host keeps the sender; every interested client subscribes
/// via [`broadcast::Sender::subscribe`].
pub fn event_channel() -> (broadcast::Sender<HostEvent>, broadcast::Receiver<HostEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
