//! Disk image cache tier, surviving process restarts.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, trace, warn};

use crate::domain::entities::ImageKey;
use crate::domain::ports::{CacheError, CacheResult};

/// Maximum disk cache size in bytes (200 MB default).
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 200 * 1024 * 1024;

/// Persistent fallback store for raw image bytes, keyed by the original URL.
///
/// Files are named after a hash of the URL, so at most one entry exists per
/// URL. Consulted by the coordinator only after a network failure.
pub struct DiskImageCache {
    cache_dir: PathBuf,
    max_size: u64,
    current_size: AtomicU64,
    item_count: AtomicUsize,
}

impl DiskImageCache {
    /// Creates a new disk cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created or scanned.
    pub async fn new(cache_dir: PathBuf, max_size: u64) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {e}")))?;

        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| CacheError::Io(format!("Failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "img")
                && let Ok(meta) = entry.metadata().await
            {
                total_size += meta.len();
                count += 1;
            }
        }

        let cache = Self {
            cache_dir,
            max_size,
            current_size: AtomicU64::new(total_size),
            item_count: AtomicUsize::new(count),
        };

        cache.cleanup_if_needed().await;

        Ok(cache)
    }

    /// Returns the path for a cached image.
    fn cache_path(&self, key: &ImageKey) -> PathBuf {
        self.cache_dir.join(format!("{}.img", key.file_stem()))
    }

    /// Gets raw image bytes from the disk tier.
    pub async fn get_bytes(&self, key: &ImageKey) -> Option<Vec<u8>> {
        let path = self.cache_path(key);
        if let Ok(bytes) = fs::read(&path).await {
            trace!(key = %key, path = %path.display(), "Disk cache hit");
            Some(bytes)
        } else {
            trace!(key = %key, "Disk cache miss");
            None
        }
    }

    /// Loads and decodes an image from the disk tier.
    ///
    /// Decode happens off the async workers; a corrupt entry behaves like a
    /// miss rather than an error.
    pub async fn get(&self, key: &ImageKey) -> Option<Arc<image::DynamicImage>> {
        let bytes = self.get_bytes(key).await?;

        let result = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;

        match result {
            Ok(Ok(img)) => {
                debug!(key = %key, "Decoded image from disk cache");
                Some(Arc::new(img))
            }
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Failed to decode cached image");
                None
            }
            Err(e) => {
                error!(key = %key, error = %e, "Decode task panicked");
                None
            }
        }
    }

    /// Stores raw bytes in the disk tier.
    ///
    /// # Errors
    /// Returns error if file cannot be created or written.
    pub async fn put_bytes(&self, key: &ImageKey, bytes: &[u8]) -> CacheResult<()> {
        let path = self.cache_path(key);

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| CacheError::Io(format!("Failed to create cache file: {e}")))?;

        file.write_all(bytes)
            .await
            .map_err(|e| CacheError::Io(format!("Failed to write cache file: {e}")))?;

        file.flush()
            .await
            .map_err(|e| CacheError::Io(format!("Failed to flush cache file: {e}")))?;

        let new_size = bytes.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_size
                    .fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_size
                    .fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_size.fetch_add(new_size, Ordering::Relaxed);
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }

        debug!(key = %key, path = %path.display(), size = bytes.len(), "Stored image in disk cache");

        self.cleanup_if_needed().await;

        Ok(())
    }

    /// Removes an image from the disk tier.
    pub async fn evict(&self, key: &ImageKey) {
        let path = self.cache_path(key);
        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key = %key, error = %e, "Failed to evict from disk cache");
            }
        } else if let Some(s) = size {
            self.current_size.fetch_sub(s, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            debug!(key = %key, "Evicted from disk cache");
        }
    }

    /// Clears the entire disk tier.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be read.
    pub async fn clear(&self) -> CacheResult<()> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| CacheError::Io(format!("Failed to read cache dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::Io(format!("Failed to read entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "img")
                && fs::remove_file(&path).await.is_err()
            {
                warn!(path = %path.display(), "Failed to remove cache file");
            }
        }
        self.current_size.store(0, Ordering::Relaxed);
        self.item_count.store(0, Ordering::Relaxed);
        debug!("Cleared disk cache");
        Ok(())
    }

    /// Returns the current cache size in bytes.
    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Returns the number of cached files.
    pub fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if an image is cached without reading it.
    pub async fn contains(&self, key: &ImageKey) -> bool {
        let path = self.cache_path(key);
        fs::try_exists(&path).await.unwrap_or(false)
    }

    /// Removes oldest-accessed entries when the byte cap is exceeded.
    async fn cleanup_if_needed(&self) {
        let current_size = self.current_size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size = current_size,
            max_size = self.max_size,
            "Disk cache over limit, cleaning up"
        );

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, std::time::SystemTime, u64)> = Vec::new();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "img") {
                continue;
            }

            if let Ok(meta) = entry.metadata().await {
                let accessed = meta.accessed().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, accessed, meta.len()));
            }
        }

        files.sort_by_key(|(_, time, _)| *time);

        let mut freed_size = 0u64;
        let mut freed_count = 0usize;
        let target = current_size - self.max_size + (self.max_size / 10);

        for (path, _, size) in files {
            if freed_size >= target {
                break;
            }

            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove old cache file");
            } else {
                debug!(path = %path.display(), "Removed old cache file");
                freed_size += size;
                freed_count += 1;
            }
        }
        self.current_size.fetch_sub(freed_size, Ordering::Relaxed);
        self.item_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(
            freed_size = freed_size,
            freed_count = freed_count,
            "Disk cache cleanup complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_cache() -> (DiskImageCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path().to_path_buf(), 1024 * 1024)
            .await
            .unwrap();
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn put_and_get_bytes() {
        let (cache, _temp) = create_test_cache().await;
        let key = ImageKey::new("https://cdn/a.jpg");
        let data = b"raw image data";

        cache.put_bytes(&key, data).await.unwrap();
        let retrieved = cache.get_bytes(&key).await;

        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap(), data);
    }

    #[tokio::test]
    async fn miss_on_unknown_key() {
        let (cache, _temp) = create_test_cache().await;
        let result = cache.get_bytes(&ImageKey::new("https://cdn/none.jpg")).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn one_file_per_url() {
        let (cache, _temp) = create_test_cache().await;
        let key = ImageKey::new("https://cdn/a.jpg");

        cache.put_bytes(&key, b"first").await.unwrap();
        cache.put_bytes(&key, b"second").await.unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_bytes(&key).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn evict_removes_entry() {
        let (cache, _temp) = create_test_cache().await;
        let key = ImageKey::new("https://cdn/a.jpg");

        cache.put_bytes(&key, b"data").await.unwrap();
        assert!(cache.contains(&key).await);

        cache.evict(&key).await;
        assert!(!cache.contains(&key).await);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let (cache, _temp) = create_test_cache().await;

        cache
            .put_bytes(&ImageKey::new("https://cdn/1.jpg"), b"data1")
            .await
            .unwrap();
        cache
            .put_bytes(&ImageKey::new("https://cdn/2.jpg"), b"data2")
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);

        cache.clear().await.unwrap();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.current_size(), 0);
    }

    #[tokio::test]
    async fn counters_follow_mutations() {
        let (cache, _temp) = create_test_cache().await;

        cache
            .put_bytes(&ImageKey::new("https://cdn/1.jpg"), b"hello")
            .await
            .unwrap();
        cache
            .put_bytes(&ImageKey::new("https://cdn/2.jpg"), b"world!")
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 11);

        cache
            .put_bytes(&ImageKey::new("https://cdn/1.jpg"), b"hey")
            .await
            .unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 9);

        cache.evict(&ImageKey::new("https://cdn/2.jpg")).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 3);
    }

    #[tokio::test]
    async fn cleanup_enforces_byte_cap() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path().to_path_buf(), 10)
            .await
            .unwrap();

        cache
            .put_bytes(&ImageKey::new("https://cdn/1.jpg"), b"123456")
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        cache
            .put_bytes(&ImageKey::new("https://cdn/2.jpg"), b"123456")
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 6);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let key = ImageKey::new("https://cdn/a.jpg");

        {
            let cache = DiskImageCache::new(temp_dir.path().to_path_buf(), 1024)
                .await
                .unwrap();
            cache.put_bytes(&key, b"persisted").await.unwrap();
        }

        let reopened = DiskImageCache::new(temp_dir.path().to_path_buf(), 1024)
            .await
            .unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get_bytes(&key).await.unwrap(), b"persisted");
    }
}
