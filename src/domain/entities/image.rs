//! Domain types for profile image handling.

use std::sync::Arc;

/// Cache key for an image. Wraps the original (non-busted) URL.
///
/// Both cache tiers are keyed by the original URL so that a cache-busted
/// network fetch and a later lookup resolve to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates a key from a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the original URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a filesystem-safe stem for the disk tier, derived by hashing
    /// the URL.
    #[must_use]
    pub fn file_stem(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Where a loaded image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the in-memory LRU cache.
    MemoryCache,
    /// Recovered from the disk tier after a network failure.
    DiskCache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image together with its key and origin.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Cache key (original URL).
    pub key: ImageKey,
    /// Decoded pixels, shared between cache and callers.
    pub image: Arc<image::DynamicImage>,
    /// Which tier satisfied the request.
    pub source: ImageSource,
}

/// Result of a successful profile image upload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Publicly resolvable download URL for the uploaded object.
    pub url: String,
    /// Storage path the object was written to.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_is_stable() {
        let url = "https://cdn.stridelog.app/profile_images/u1_1700000000.jpg";
        let a = ImageKey::new(url).file_stem();
        let b = ImageKey::new(url).file_stem();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn file_stem_differs_per_url() {
        let a = ImageKey::new("https://cdn/x.jpg").file_stem();
        let b = ImageKey::new("https://cdn/y.jpg").file_stem();
        assert_ne!(a, b);
    }

    #[test]
    fn key_keeps_original_url() {
        let key = ImageKey::new("https://cdn/x.jpg");
        assert_eq!(key.as_str(), "https://cdn/x.jpg");
        assert_eq!(key.to_string(), "https://cdn/x.jpg");
    }
}
