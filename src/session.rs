//! Aggregate client session
//!
//! `Session` is the one state object the presentation layer reads and
//! drives. It exclusively owns the listing sessions, both registries,
//! the thumbnail cache, the auto-switch timers and the persisted
//! settings; every user action goes through exactly one of its methods,
//! which mutates exactly one sub-component.
//!
//! Lifecycle is explicit: `init` loads the persisted snapshot, `flush`
//! writes it back, `teardown` additionally stops all timers. Nothing is
//! resumed implicitly on startup; the embedding application decides
//! whether to call `resume_auto_switch`.

use crate::cache::ImageCache;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::host::{Host, HostEvent};
use crate::listing::{ListingPage, ListingStore};
use crate::registry::{Downloads, Favorites};
use crate::scheduler::AutoSwitchScheduler;
use crate::types::{WallpaperRecord, WallpaperSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info, warn};

/// Where the session persists its state. Injectable so tests (and
/// portable installs) can point everything at their own directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub config: PathBuf,
    pub favorites: PathBuf,
    pub downloads: PathBuf,
    pub cache_dir: PathBuf,
}

impl StoragePaths {
    /// Platform directories (config/data/cache split per OS convention).
    pub fn default_dirs() -> Self {
        match directories::ProjectDirs::from("com", "wallmate", "wallmate") {
            Some(dirs) => Self {
                config: dirs.config_dir().join("config.toml"),
                favorites: dirs.data_dir().join("favorites.json"),
                downloads: dirs.data_dir().join("downloads.json"),
                cache_dir: dirs.cache_dir().join("thumbs"),
            },
            None => Self::under(Path::new("/tmp/wallmate")),
        }
    }

    /// Everything under one root directory.
    pub fn under(root: &Path) -> Self {
        Self {
            config: root.join("config.toml"),
            favorites: root.join("favorites.json"),
            downloads: root.join("downloads.json"),
            cache_dir: root.join("thumbs"),
        }
    }
}

/// The aggregate client state, generic over the host it calls into.
pub struct Session<H: Host> {
    host: Arc<H>,
    paths: StoragePaths,
    config: ClientConfig,
    listings: ListingStore,
    favorites: Favorites,
    downloads: Downloads,
    cache: Arc<ImageCache>,
    scheduler: AutoSwitchScheduler<H>,
    current: Option<WallpaperRecord>,
}

impl<H: Host> Session<H> {
    /// Build a session from the persisted snapshot (settings plus both
    /// registries). Listing state and the thumbnail cache start empty;
    /// auto-switch timers start stopped.
    pub fn init(host: Arc<H>, paths: StoragePaths) -> Result<Self> {
        let config = ClientConfig::load(&paths.config)?;
        let favorites = Favorites::load(paths.favorites.clone())?;
        let downloads = Downloads::load(paths.downloads.clone())?;
        let cache = Arc::new(ImageCache::new(paths.cache_dir.clone()));
        let scheduler = AutoSwitchScheduler::new(host.clone());

        Ok(Self {
            host,
            paths,
            config,
            listings: ListingStore::new(),
            favorites,
            downloads,
            cache,
            scheduler,
            current: None,
        })
    }

    /// Write the persisted slice of state back to disk.
    pub fn flush(&self) -> Result<()> {
        self.config.save(&self.paths.config)?;
        self.favorites.save()?;
        self.downloads.save()?;
        Ok(())
    }

    /// Stop all timers and flush.
    pub fn teardown(&mut self) -> Result<()> {
        self.scheduler.shutdown();
        self.flush()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    /// Shared handle for thumbnail prefetch fan-out.
    pub fn image_cache(&self) -> Arc<ImageCache> {
        self.cache.clone()
    }

    // --- current wallpaper ---

    pub fn current(&self) -> Option<&WallpaperRecord> {
        self.current.as_ref()
    }

    /// Ask the host for the next wallpaper of the configured source and
    /// install it as current. Both manual calls and scheduler ticks end
    /// up in the same slot; the later result wins.
    pub async fn fetch_next(&mut self) -> Result<WallpaperRecord> {
        let source = self.config.random_source;
        let api_key = self.config.api_key_for(source);
        let record = self.host.fetch_next_wallpaper(source, api_key).await?;
        self.current = Some(record.clone());
        Ok(record)
    }

    /// Set the OS wallpaper from a record.
    pub async fn apply_wallpaper(&self, record: &WallpaperRecord) -> Result<()> {
        self.host.set_wallpaper(record).await
    }

    // --- listing ---

    /// Listing state for a source (the canonical unloaded page for a
    /// source never seen).
    pub fn listing_page(&mut self, source: WallpaperSource) -> &ListingPage {
        self.listings.page(source)
    }

    pub fn is_listing_fetching(&self, source: WallpaperSource) -> bool {
        self.listings.is_fetching(source)
    }

    /// Fetch one page for a source. Returns whether the result was
    /// committed: `Ok(false)` means the request was out of bounds or a
    /// newer request for the same source superseded it mid-flight.
    pub async fn load_page(&mut self, source: WallpaperSource, page: u32) -> Result<bool> {
        let Some(ticket) = self.listings.begin_fetch(source, page) else {
            return Ok(false);
        };
        let api_key = self.config.api_key_for(source);
        match self
            .host
            .fetch_wallpapers_list(source, ticket.page(), api_key)
            .await
        {
            Ok(response) => Ok(self.listings.commit_page(ticket, response)),
            Err(err) => {
                self.listings.commit_failure(ticket);
                Err(err)
            }
        }
    }

    /// Switch the browse view to another source, keeping every other
    /// source's page state intact. Fetches page 1 only if the source
    /// was never loaded.
    pub async fn select_list_source(&mut self, source: WallpaperSource) -> Result<()> {
        self.config.list_source = source;
        self.config.save(&self.paths.config)?;

        if !self.listings.page(source).loaded && !self.listings.is_fetching(source) {
            self.load_page(source, 1).await?;
        }
        Ok(())
    }

    pub async fn next_page(&mut self) -> Result<bool> {
        let source = self.config.list_source;
        let page = self.listings.page(source);
        if !page.loaded || page.page >= page.last_page {
            return Ok(false);
        }
        let target = page.page + 1;
        self.load_page(source, target).await
    }

    pub async fn prev_page(&mut self) -> Result<bool> {
        let source = self.config.list_source;
        let page = self.listings.page(source);
        if !page.loaded || page.page <= 1 {
            return Ok(false);
        }
        let target = page.page - 1;
        self.load_page(source, target).await
    }

    /// Re-fetch the current page of the active source.
    pub async fn refresh(&mut self) -> Result<bool> {
        let source = self.config.list_source;
        let target = self.listings.page(source).page;
        self.load_page(source, target).await
    }

    /// Local thumbnail for a remote URL, fetched on miss or expiry.
    pub async fn thumbnail(&self, url: &str) -> Result<PathBuf> {
        self.cache.get_or_store(url).await
    }

    // --- favorites / downloads ---

    /// Toggle a favorite and persist. Returns the resulting membership.
    pub fn toggle_favorite(&mut self, record: WallpaperRecord) -> Result<bool> {
        let now_favorite = self.favorites.toggle(record);
        self.favorites.save()?;
        Ok(now_favorite)
    }

    pub fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        let removed = self.favorites.remove(id);
        if removed {
            self.favorites.save()?;
        }
        Ok(removed)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Download through the host, then record (or update) the entry.
    pub async fn download(&mut self, record: WallpaperRecord) -> Result<PathBuf> {
        let local_path = self.host.download_wallpaper(&record).await?;
        self.downloads.add(record, local_path.clone());
        self.downloads.save()?;
        Ok(local_path)
    }

    pub fn is_downloaded(&self, id: &str) -> bool {
        self.downloads.contains(id)
    }

    /// Reconcile the registry with the files the host actually has.
    pub async fn sync_downloads(&mut self) -> Result<()> {
        let listed = self.host.list_downloads().await?;
        self.downloads.sync_from_host(listed);
        self.downloads.save()?;
        Ok(())
    }

    /// Delete a download on the host side; the registry entry goes only
    /// if the host confirms the file was removed.
    pub async fn delete_download(&mut self, id: &str) -> Result<bool> {
        if !self.host.delete_download(id).await? {
            return Ok(false);
        }
        self.downloads.remove(id);
        self.downloads.save()?;
        Ok(true)
    }

    /// Show a downloaded file in the platform file browser. `Ok(false)`
    /// if the id is not in the registry.
    pub async fn reveal_download(&self, id: &str) -> Result<bool> {
        let Some(path) = self.downloads.local_path(id) else {
            return Ok(false);
        };
        self.host.reveal_in_file_browser(path).await?;
        Ok(true)
    }

    // --- auto switch ---

    /// Start (or restart with a new interval) the auto-switch for a
    /// source, remembering the interval as the preferred one.
    pub async fn enable_auto_switch(
        &mut self,
        source: WallpaperSource,
        interval_seconds: u64,
    ) -> Result<()> {
        self.config.interval_seconds = interval_seconds;
        self.config.save(&self.paths.config)?;

        let api_key = self.config.api_key_for(source);
        self.scheduler.enable(source, interval_seconds, api_key).await
    }

    pub async fn disable_auto_switch(&mut self, source: WallpaperSource) -> Result<()> {
        self.scheduler.disable(source).await
    }

    pub fn auto_switch_running(&self, source: WallpaperSource) -> bool {
        self.scheduler.is_running(source)
    }

    pub fn auto_switch_interval(&self, source: WallpaperSource) -> Option<u64> {
        self.scheduler.interval(source)
    }

    /// Explicitly restart a source whose stored host-side configuration
    /// says it was enabled. Returns whether a timer was started. This is
    /// the only way a schedule comes back after a restart.
    pub async fn resume_auto_switch(&mut self, source: WallpaperSource) -> Result<bool> {
        let Some(settings) = self.host.get_auto_switch_config(source).await? else {
            return Ok(false);
        };
        if !settings.enabled {
            return Ok(false);
        }

        let api_key = self.config.api_key_for(source);
        self.scheduler
            .enable(source, settings.interval_seconds, api_key)
            .await?;
        Ok(true)
    }

    // --- host push notifications ---

    /// React to one push notification. Assignment semantics make this
    /// idempotent under duplicate delivery, and out-of-order delivery
    /// degenerates to last-write-wins, the same policy as overlapping
    /// fetches.
    pub fn apply_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::WallpaperFetched(record) => {
                debug!(id = %record.id, "host fetched wallpaper");
                self.current = Some(record);
            }
            HostEvent::WallpaperSet(path) => {
                info!(path = %path.display(), "host applied wallpaper");
            }
        }
    }

    /// Apply everything currently queued on an event subscription
    /// without blocking. Returns how many events were applied.
    pub fn drain_events(&mut self, rx: &mut broadcast::Receiver<HostEvent>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "host event stream lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        applied
    }

    // --- settings ---

    pub fn set_random_source(&mut self, source: WallpaperSource) -> Result<()> {
        self.config.random_source = source;
        self.config.save(&self.paths.config)
    }

    pub fn set_interval(&mut self, interval_seconds: u64) -> Result<()> {
        self.config.interval_seconds = interval_seconds;
        self.config.save(&self.paths.config)
    }

    pub fn set_wallhaven_api_key(&mut self, key: Option<String>) -> Result<()> {
        self.config.wallhaven_api_key = key;
        self.config.save(&self.paths.config)
    }
}
