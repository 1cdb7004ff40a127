//! WallMate client core
//!
//! The state and caching layer of a desktop wallpaper browser: per-source
//! paginated listing sessions, persisted favorite/download registries, a
//! TTL'd thumbnail cache and per-source auto-switch timers, composed
//! behind a [`Session`] façade. Image retrieval, file I/O and the actual
//! OS wallpaper change are delegated to a host application through the
//! [`Host`] trait; the host pushes [`HostEvent`] notifications back.

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod listing;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod types;
mod util;

pub use cache::ImageCache;
pub use config::ClientConfig;
pub use error::{Result, WallpaperError};
pub use host::{Host, HostEvent};
pub use listing::{FetchTicket, ListingPage, ListingStore};
pub use registry::{DownloadEntry, Downloads, FavoriteEntry, Favorites};
pub use scheduler::AutoSwitchScheduler;
pub use session::{Session, StoragePaths};
pub use types::{
    AutoSwitchSettings, PaginatedResponse, WallpaperListItem, WallpaperRecord, WallpaperSource,
};
