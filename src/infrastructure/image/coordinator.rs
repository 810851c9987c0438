//! Cache coordinator: resolves image URLs across tiers and keeps the caches
//! consistent after uploads.
//!
//! Lookup order is memory, then network (cache-busted), then disk as a
//! fallback for failed fetches. Concurrent loads for the same URL are
//! deduplicated through an in-flight request map, and individual loads can
//! be cancelled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::domain::entities::{ImageKey, ImageSource, LoadedImage, UploadedImage, UserId};
use crate::domain::ports::{
    CacheError, CacheResult, ImageCachePort, ImageFetchPort, ObjectStoragePort,
};

use super::disk_cache::DiskImageCache;
use super::fetcher::bust_url;
use super::memory_cache::MemoryImageCache;
use crate::infrastructure::events::{CacheEvent, CacheEventBus};

/// JPEG quality used when compressing uploads (0.9 of full quality).
pub const JPEG_QUALITY: u8 = 90;

/// Storage prefix for uploaded profile images.
const UPLOAD_PREFIX: &str = "profile_images";

struct InFlight {
    tx: broadcast::Sender<Result<LoadedImage, CacheError>>,
    abort: tokio::task::AbortHandle,
}

/// Orchestrates image loading, verification and upload across cache tiers.
pub struct CacheCoordinator {
    memory: Arc<MemoryImageCache>,
    disk: Arc<DiskImageCache>,
    fetcher: Arc<dyn ImageFetchPort>,
    storage: Arc<dyn ObjectStoragePort>,
    in_flight: Arc<Mutex<HashMap<ImageKey, InFlight>>>,
    events: CacheEventBus,
}

impl std::fmt::Debug for CacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("memory_entries", &self.memory.len())
            .finish_non_exhaustive()
    }
}

impl CacheCoordinator {
    /// Creates a coordinator over explicitly constructed tiers and ports.
    #[must_use]
    pub fn new(
        memory: Arc<MemoryImageCache>,
        disk: Arc<DiskImageCache>,
        fetcher: Arc<dyn ImageFetchPort>,
        storage: Arc<dyn ObjectStoragePort>,
        events: CacheEventBus,
    ) -> Self {
        Self {
            memory,
            disk,
            fetcher,
            storage,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Resolves `url` to a decoded image.
    ///
    /// With `force_reload` false a memory hit returns immediately. Otherwise
    /// a cache-busted GET is issued; on success the memory cache is seeded
    /// (and the raw bytes persisted to disk in the background), on failure
    /// the disk tier is consulted under the original URL before giving up.
    ///
    /// Concurrent calls for the same URL share a single fetch.
    ///
    /// # Errors
    /// Returns the fetch error when the network fails and the disk tier has
    /// no entry, or [`CacheError::Cancelled`] if the load was cancelled.
    pub async fn load(&self, url: &str, force_reload: bool) -> CacheResult<LoadedImage> {
        let key = ImageKey::new(url);

        loop {
            if !force_reload
                && let Some(img) = self.memory.get(&key).await
            {
                return Ok(LoadedImage {
                    key: key.clone(),
                    image: img,
                    source: ImageSource::MemoryCache,
                });
            }

            let mut rx = {
                let mut map = self.in_flight.lock().expect("in-flight map poisoned");
                if let Some(entry) = map.get(&key) {
                    entry.tx.subscribe()
                } else {
                    let (tx, rx) = broadcast::channel(1);
                    let abort = self.spawn_fetch(key.clone(), url.to_string());
                    map.insert(key.clone(), InFlight { tx, abort });
                    rx
                }
            };

            match rx.recv().await {
                Ok(result) => return result,
                // Raced with a completion that removed the entry before we
                // subscribed; the next pass hits the cache or refetches.
                Err(broadcast::error::RecvError::Closed)
                | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Spawns the shared fetch task for one key; completion is delivered
    /// through the in-flight map entry.
    fn spawn_fetch(&self, key: ImageKey, url: String) -> tokio::task::AbortHandle {
        let memory = self.memory.clone();
        let disk = self.disk.clone();
        let fetcher = self.fetcher.clone();
        let in_flight = self.in_flight.clone();

        let handle = tokio::spawn(async move {
            let result = fetch_with_fallback(&memory, &disk, fetcher.as_ref(), &key, &url).await;

            // Remove before sending so late subscribers refetch instead of
            // waiting on a channel that will never deliver.
            let entry = in_flight.lock().expect("in-flight map poisoned").remove(&key);
            if let Some(entry) = entry {
                let _ = entry.tx.send(result);
            }
        });

        handle.abort_handle()
    }

    /// Checks whether `url` resolves to an existing image (HTTP HEAD, 200
    /// only). Transport errors count as "does not exist".
    pub async fn verify(&self, url: &str) -> bool {
        self.fetcher.exists(url).await
    }

    /// Startup warmup: verifies the URL exists, then loads it through the
    /// normal pipeline. Failures are swallowed; a missing avatar just means
    /// the placeholder is shown.
    pub async fn preload(&self, url: &str) -> Option<LoadedImage> {
        if !self.verify(url).await {
            debug!(url = %url, "Preload skipped, image does not exist");
            return None;
        }
        match self.load(url, false).await {
            Ok(loaded) => Some(loaded),
            Err(e) => {
                warn!(url = %url, error = %e, "Preload failed");
                None
            }
        }
    }

    /// Preloads several URLs concurrently; returns how many succeeded.
    pub async fn preload_batch(&self, urls: &[String]) -> usize {
        let results = join_all(urls.iter().map(|url| self.preload(url))).await;
        results.into_iter().flatten().count()
    }

    /// Compresses and uploads a new profile image for `user_id`.
    ///
    /// The storage path embeds the user id and upload timestamp so every
    /// upload lands on a fresh object. On success, stale cache entries for
    /// the returned URL are invalidated, the memory cache is seeded with the
    /// uploaded image, and a cache-updated event is broadcast.
    ///
    /// # Errors
    /// Encode failures are terminal; storage failures are surfaced verbatim.
    /// Nothing is retried.
    pub async fn upload(
        &self,
        image: Arc<image::DynamicImage>,
        user_id: &UserId,
        progress: Option<mpsc::UnboundedSender<f32>>,
    ) -> CacheResult<UploadedImage> {
        let bytes = encode_jpeg(image.clone()).await?;

        let path = format!(
            "{UPLOAD_PREFIX}/{}_{}.jpg",
            user_id,
            Utc::now().timestamp()
        );
        debug!(path = %path, size = bytes.len(), "Uploading profile image");

        let url = self
            .storage
            .put(&path, bytes, "image/jpeg", progress)
            .await?;

        let key = ImageKey::new(&url);
        // Normally a no-op; guards against the storage layer reusing a URL.
        self.memory.evict(&key).await;
        self.disk.evict(&key).await;

        self.memory.put(key, image).await;
        self.events.publish();

        info!(url = %url, user = %user_id, "Profile image uploaded, cache seeded");

        Ok(UploadedImage { url, path })
    }

    /// Cancels an in-flight load for `url`, if any. Waiters receive
    /// [`CacheError::Cancelled`].
    pub fn cancel(&self, url: &str) {
        let key = ImageKey::new(url);
        let entry = self.in_flight.lock().expect("in-flight map poisoned").remove(&key);
        if let Some(entry) = entry {
            entry.abort.abort();
            let _ = entry.tx.send(Err(CacheError::Cancelled(key.to_string())));
            debug!(key = %key, "Cancelled image load");
        }
    }

    /// Cancels every in-flight load.
    pub fn cancel_all(&self) {
        let entries: Vec<(ImageKey, InFlight)> = self
            .in_flight
            .lock()
            .expect("in-flight map poisoned")
            .drain()
            .collect();
        let count = entries.len();
        for (key, entry) in entries {
            entry.abort.abort();
            let _ = entry.tx.send(Err(CacheError::Cancelled(key.to_string())));
        }
        if count > 0 {
            debug!(count = count, "Cancelled all pending image loads");
        }
    }

    /// Returns true if a load for `url` is currently in flight.
    pub fn is_loading(&self, url: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight map poisoned")
            .contains_key(&ImageKey::new(url))
    }

    /// Returns the number of in-flight loads.
    pub fn pending_count(&self) -> usize {
        self.in_flight.lock().expect("in-flight map poisoned").len()
    }

    /// Subscribes to cache-updated events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Returns memory tier statistics.
    #[must_use]
    pub fn memory_stats(&self) -> super::memory_cache::CacheStats {
        self.memory.stats()
    }

    /// Clears both cache tiers.
    pub async fn clear_all(&self) {
        self.memory.clear().await;
        if let Err(e) = self.disk.clear().await {
            warn!(error = %e, "Failed to clear disk cache");
        }
        info!("Cleared all image caches");
    }
}

/// Network fetch with disk fallback; seeds the memory cache on every
/// successful resolution.
async fn fetch_with_fallback(
    memory: &Arc<MemoryImageCache>,
    disk: &Arc<DiskImageCache>,
    fetcher: &dyn ImageFetchPort,
    key: &ImageKey,
    url: &str,
) -> Result<LoadedImage, CacheError> {
    let busted = bust_url(url, Utc::now().timestamp());

    match fetch_and_decode(fetcher, &busted).await {
        Ok((bytes, img)) => {
            memory.put(key.clone(), img.clone()).await;

            let disk = disk.clone();
            let key_for_disk = key.clone();
            tokio::spawn(async move {
                if let Err(e) = disk.put_bytes(&key_for_disk, &bytes).await {
                    warn!(key = %key_for_disk, error = %e, "Failed to cache to disk");
                }
            });

            Ok(LoadedImage {
                key: key.clone(),
                image: img,
                source: ImageSource::Network,
            })
        }
        Err(fetch_err) => {
            debug!(key = %key, error = %fetch_err, "Network fetch failed, trying disk tier");
            if let Some(img) = disk.get(key).await {
                memory.put(key.clone(), img.clone()).await;
                Ok(LoadedImage {
                    key: key.clone(),
                    image: img,
                    source: ImageSource::DiskCache,
                })
            } else {
                Err(fetch_err)
            }
        }
    }
}

/// Downloads and decodes one image. A non-decodable body is reported as a
/// decode error, which callers treat like a network failure.
async fn fetch_and_decode(
    fetcher: &dyn ImageFetchPort,
    url: &str,
) -> CacheResult<(Bytes, Arc<image::DynamicImage>)> {
    let bytes = fetcher.fetch(url).await?;

    let bytes_for_decode = bytes.clone();
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes_for_decode))
        .await
        .map_err(|e| CacheError::Decode(format!("Decode task panicked: {e}")))?
        .map_err(|e| CacheError::Decode(format!("Failed to decode image: {e}")))?;

    Ok((bytes, Arc::new(decoded)))
}

/// Compresses an image to JPEG at the fixed upload quality.
async fn encode_jpeg(image: Arc<image::DynamicImage>) -> CacheResult<Bytes> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            std::io::Cursor::new(&mut buf),
            JPEG_QUALITY,
        );
        image.write_with_encoder(encoder)?;
        Ok(buf)
    })
    .await
    .map_err(|e| CacheError::Encode(format!("Encode task panicked: {e}")))?
    .map(Bytes::from)
    .map_err(|e| CacheError::Encode(format!("Failed to encode JPEG: {e}")))
}
