//! Port definitions for image caching and fetching.

use std::sync::Arc;

use bytes::Bytes;

use crate::domain::entities::ImageKey;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur in the image pipeline.
///
/// `Clone` so a single fetch result can be broadcast to every caller waiting
/// on a deduplicated in-flight request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Image not present in any tier.
    #[error("image not found: {0}")]
    NotFound(String),
    /// Body bytes are not a decodable image. Treated like a network failure
    /// for fallback purposes.
    #[error("decode error: {0}")]
    Decode(String),
    /// Failed to compress an image for upload. Terminal, never retried.
    #[error("encode error: {0}")]
    Encode(String),
    /// Disk tier I/O failure.
    #[error("io error: {0}")]
    Io(String),
    /// Transport failure or non-200 status.
    #[error("network error: {0}")]
    Network(String),
    /// Object storage upload failure, surfaced verbatim.
    #[error("storage error: {0}")]
    Storage(String),
    /// The in-flight request was cancelled before completing.
    #[error("load cancelled for {0}")]
    Cancelled(String),
}

/// Port for a single cache tier keyed by image URL.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Attempts to get an image from the cache.
    /// Returns None if not cached.
    async fn get(&self, key: &ImageKey) -> Option<Arc<image::DynamicImage>>;

    /// Stores an image in the cache, replacing any entry for the same key.
    async fn put(&self, key: ImageKey, image: Arc<image::DynamicImage>);

    /// Removes an image from the cache.
    async fn evict(&self, key: &ImageKey);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    async fn clear(&self);
}

/// Port for raw image retrieval over the network.
#[async_trait::async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Issues a GET for `url` and returns the body bytes.
    /// Any non-200 status is an error.
    async fn fetch(&self, url: &str) -> CacheResult<Bytes>;

    /// Issues a HEAD for `url`. True iff the response status is 200;
    /// transport errors count as "does not exist".
    async fn exists(&self, url: &str) -> bool;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scriptable fetcher that records every request it sees.
    ///
    /// Responses are registered under the original URL and matched by prefix
    /// so cache-busted requests (`url?t=...`) resolve to the same script.
    #[derive(Default)]
    pub struct MockImageFetcher {
        responses: Mutex<HashMap<String, Result<Bytes, CacheError>>>,
        exists: Mutex<HashMap<String, bool>>,
        get_log: Mutex<Vec<String>>,
        head_log: Mutex<Vec<String>>,
        delay: Mutex<Option<std::time::Duration>>,
    }

    impl MockImageFetcher {
        /// Creates an empty mock; unscripted URLs fail with a 404-style error.
        pub fn new() -> Self {
            Self::default()
        }

        /// Scripts a successful GET response.
        pub fn respond_with(&self, url: &str, bytes: impl Into<Bytes>) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(bytes.into()));
        }

        /// Scripts a failing GET response.
        pub fn fail_with(&self, url: &str, error: CacheError) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Err(error));
        }

        /// Delays every subsequent GET, keeping requests in flight long
        /// enough to observe deduplication and cancellation.
        pub fn set_delay(&self, delay: std::time::Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// Scripts the HEAD existence answer for a URL.
        pub fn set_exists(&self, url: &str, value: bool) {
            self.exists.lock().unwrap().insert(url.to_string(), value);
        }

        /// Returns every GET request issued so far.
        pub fn get_requests(&self) -> Vec<String> {
            self.get_log.lock().unwrap().clone()
        }

        /// Returns the number of GET requests issued so far.
        pub fn get_count(&self) -> usize {
            self.get_log.lock().unwrap().len()
        }

        /// Returns every HEAD request issued so far.
        pub fn head_requests(&self) -> Vec<String> {
            self.head_log.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ImageFetchPort for MockImageFetcher {
        async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
            self.get_log.lock().unwrap().push(url.to_string());
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let responses = self.responses.lock().unwrap();
            responses
                .iter()
                .find(|(scripted, _)| url.starts_with(scripted.as_str()))
                .map_or_else(
                    || Err(CacheError::Network("HTTP 404 Not Found".to_string())),
                    |(_, response)| response.clone(),
                )
        }

        async fn exists(&self, url: &str) -> bool {
            self.head_log.lock().unwrap().push(url.to_string());
            self.exists.lock().unwrap().get(url).copied().unwrap_or(false)
        }
    }
}
