//! In-memory LRU image cache tier.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::ImageKey;
use crate::domain::ports::ImageCachePort;

/// Default maximum number of decoded images held in memory.
pub const DEFAULT_CAPACITY: usize = 50;

/// In-memory LRU cache for decoded profile images.
///
/// Not a singleton: the composition root constructs one and hands out `Arc`
/// references. At most one entry exists per URL; `put` on an existing key
/// replaces the entry.
pub struct MemoryImageCache {
    cache: RwLock<LruCache<ImageKey, Arc<image::DynamicImage>>>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(cap)),
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(std::sync::atomic::Ordering::Relaxed);
        let misses = self.misses.load(std::sync::atomic::Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Statistics about memory tier performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, key: &ImageKey) -> Option<Arc<image::DynamicImage>> {
        let mut cache = self.cache.write().await;
        if let Some(img) = cache.get(key) {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    async fn put(&self, key: ImageKey, image: Arc<image::DynamicImage>) {
        let mut cache = self.cache.write().await;
        debug!(key = %key, "Storing image in memory cache");
        cache.put(key, image);
    }

    async fn evict(&self, key: &ImageKey) {
        let mut cache = self.cache.write().await;
        if cache.pop(key).is_some() {
            debug!(key = %key, "Evicted image from memory cache");
        }
    }

    fn len(&self) -> usize {
        // Best-effort estimate; may lag concurrent writers briefly
        let cache = self.cache.try_read();
        cache.map(|c| c.len()).unwrap_or(0)
    }

    async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        debug!("Cleared memory image cache");
    }
}
