//! Thumbnail byte cache
//!
//! Write-through, pull-based: a remote URL is fetched once, materialized
//! as a file under the cache directory, and served from disk until the
//! entry outlives its TTL. Expired entries are evicted lazily on lookup;
//! `sweep` can additionally run to bound disk growth. Nothing here is
//! persisted across restarts; the entry map is rebuilt by refetching.

use crate::error::Result;
use crate::util::unix_now;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long a cached thumbnail stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One materialized thumbnail.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Local blob file.
    pub path: PathBuf,
    /// Unix seconds when the blob was written.
    pub stored_at: u64,
}

/// URL-keyed thumbnail cache with time-based expiry.
pub struct ImageCache {
    dir: PathBuf,
    ttl_secs: u64,
    client: reqwest::Client,
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Per-URL gates so concurrent `store` calls for one URL coalesce
    /// into a single fetch. Distinct URLs fan out freely.
    in_flight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ImageCache {
    pub fn new(dir: PathBuf) -> Self {
        Self::with_ttl(dir, DEFAULT_TTL)
    }

    pub fn with_ttl(dir: PathBuf, ttl: Duration) -> Self {
        let _ = fs::create_dir_all(&dir);

        Self {
            dir,
            ttl_secs: ttl.as_secs(),
            client: reqwest::Client::builder()
                .user_agent(format!("WallMate/{}", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            entries: Mutex::new(HashMap::new()),
            in_flight: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Platform default cache directory.
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "wallmate", "wallmate")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("/tmp/wallmate"))
            .join("thumbs")
    }

    /// Look up a URL. Expired entries (and entries whose blob file has
    /// vanished) are deleted as a side effect and reported as absent.
    pub fn lookup(&self, url: &str) -> Option<PathBuf> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let entry = entries.get(url)?;

        let expired = unix_now().saturating_sub(entry.stored_at) >= self.ttl_secs;
        if expired || !entry.path.exists() {
            if let Some(stale) = entries.remove(url) {
                let _ = fs::remove_file(&stale.path);
            }
            return None;
        }

        Some(entry.path.clone())
    }

    /// Fetch a URL into the cache and return the blob path.
    ///
    /// Concurrent calls for the same URL wait for the first fetch and
    /// share its result instead of downloading twice. On failure nothing
    /// is recorded, so the next caller retries.
    pub async fn store(&self, url: &str) -> Result<PathBuf> {
        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let _guard = gate.lock().await;

        // A coalesced fetch may have landed while we waited on the gate.
        if let Some(path) = self.lookup(url) {
            return Ok(path);
        }

        let result = self.fetch_to_disk(url).await;
        if let Ok(path) = &result {
            let mut entries = self.entries.lock().expect("cache lock poisoned");
            entries.insert(
                url.to_string(),
                CacheEntry {
                    path: path.clone(),
                    stored_at: unix_now(),
                },
            );
        }

        self.in_flight.lock().await.remove(url);
        result
    }

    /// Serve from cache, fetching on miss or expiry.
    pub async fn get_or_store(&self, url: &str) -> Result<PathBuf> {
        if let Some(path) = self.lookup(url) {
            return Ok(path);
        }
        self.store(url).await
    }

    /// Proactively drop every expired entry and its blob file.
    pub fn sweep(&self) {
        let now = unix_now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.retain(|_, entry| {
            let valid = now.saturating_sub(entry.stored_at) < self.ttl_secs;
            if !valid {
                let _ = fs::remove_file(&entry.path);
            }
            valid
        });
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    async fn fetch_to_disk(&self, url: &str) -> Result<PathBuf> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        fs::create_dir_all(&self.dir)?;
        let path = self.blob_path(url);
        fs::write(&path, &bytes)?;
        Ok(path)
    }

    /// Hash-derived blob filename for a URL.
    fn blob_path(&self, url: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        self.dir.join(format!("{:016x}.img", hasher.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal HTTP server answering every request with the same body,
    /// counting how many requests it actually served.
    fn serve_bytes(body: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let addr = listener.local_addr().expect("test server addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_server = hits.clone();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                hits_server.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.write_all(body);
            }
        });

        (format!("http://{addr}/thumb.jpg"), hits)
    }

    fn seeded_entry(cache: &ImageCache, url: &str, age_secs: u64) -> PathBuf {
        let path = cache.dir.join(format!("seed-{age_secs}.img"));
        fs::write(&path, b"blob").expect("write blob");
        cache.entries.lock().expect("cache lock poisoned").insert(
            url.to_string(),
            CacheEntry {
                path: path.clone(),
                stored_at: unix_now().saturating_sub(age_secs),
            },
        );
        path
    }

    #[test]
    fn lookup_misses_on_unknown_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());
        assert!(cache.lookup("https://example.com/none.jpg").is_none());
    }

    #[test]
    fn fresh_entry_is_served_and_expired_entry_is_reclaimed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());

        let fresh = seeded_entry(&cache, "https://example.com/fresh.jpg", 1);
        assert_eq!(cache.lookup("https://example.com/fresh.jpg"), Some(fresh));

        let stale = seeded_entry(&cache, "https://example.com/stale.jpg", 25 * 60 * 60);
        assert!(cache.lookup("https://example.com/stale.jpg").is_none());
        // Lazy eviction removed both the entry and the blob file.
        assert!(!stale.exists());
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn lookup_misses_when_blob_file_vanished() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());

        let path = seeded_entry(&cache, "https://example.com/gone.jpg", 1);
        fs::remove_file(&path).expect("remove blob");
        assert!(cache.lookup("https://example.com/gone.jpg").is_none());
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn sweep_reclaims_only_expired_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());

        let fresh = seeded_entry(&cache, "https://example.com/fresh.jpg", 60);
        let stale = seeded_entry(&cache, "https://example.com/stale.jpg", 30 * 60 * 60);

        cache.sweep();

        assert!(fresh.exists());
        assert!(!stale.exists());
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn store_fetches_once_and_lookup_serves_after() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());
        let (url, hits) = serve_bytes(b"jpegbytes");

        let path = cache.store(&url).await.expect("store");
        assert_eq!(fs::read(&path).expect("read blob"), b"jpegbytes");
        assert_eq!(cache.lookup(&url), Some(path.clone()));

        // A second get goes to disk, not the network.
        let again = cache.get_or_store(&url).await.expect("cached");
        assert_eq!(again, path);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_stores_coalesce_into_one_fetch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = Arc::new(ImageCache::new(dir.path().to_path_buf()));
        let (url, hits) = serve_bytes(b"shared");

        let a = {
            let cache = cache.clone();
            let url = url.clone();
            tokio::spawn(async move { cache.store(&url).await })
        };
        let b = {
            let cache = cache.clone();
            let url = url.clone();
            tokio::spawn(async move { cache.store(&url).await })
        };

        let first = a.await.expect("join").expect("store");
        let second = b.await.expect("join").expect("store");
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_store_records_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ImageCache::new(dir.path().to_path_buf());

        // Grab a port and close it again so the connection is refused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = format!("http://127.0.0.1:{port}/thumb.jpg");

        assert!(cache.store(&url).await.is_err());
        assert_eq!(cache.entry_count(), 0);
        assert!(cache.lookup(&url).is_none());
    }
}
