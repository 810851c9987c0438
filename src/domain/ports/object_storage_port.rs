//! Object storage port definition.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::image_cache_port::CacheResult;

/// Port for the cloud object store that holds uploaded profile images.
#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    /// Uploads `bytes` to `path` with the given content type and returns a
    /// publicly resolvable download URL.
    ///
    /// Fractional progress in `0.0..=1.0` is delivered to `progress` when an
    /// observer is supplied. Upload failures are surfaced verbatim and never
    /// retried.
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        progress: Option<mpsc::UnboundedSender<f32>>,
    ) -> CacheResult<String>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::ports::CacheError;
    use std::sync::Mutex;

    /// A recorded upload.
    #[derive(Debug, Clone)]
    pub struct RecordedPut {
        pub path: String,
        pub bytes: Bytes,
        pub content_type: String,
    }

    /// Mock object store that records uploads and mints public URLs.
    pub struct MockObjectStorage {
        puts: Mutex<Vec<RecordedPut>>,
        fail: Mutex<Option<String>>,
    }

    impl MockObjectStorage {
        /// Creates a mock that accepts all uploads.
        pub fn new() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail: Mutex::new(None),
            }
        }

        /// Makes subsequent uploads fail with the given message.
        pub fn fail_with(&self, message: impl Into<String>) {
            *self.fail.lock().unwrap() = Some(message.into());
        }

        /// Returns all recorded uploads.
        pub fn puts(&self) -> Vec<RecordedPut> {
            self.puts.lock().unwrap().clone()
        }

        /// Returns the public URL the mock mints for a path.
        pub fn public_url(path: &str) -> String {
            format!("https://storage.example.com/{path}")
        }
    }

    impl Default for MockObjectStorage {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ObjectStoragePort for MockObjectStorage {
        async fn put(
            &self,
            path: &str,
            bytes: Bytes,
            content_type: &str,
            progress: Option<mpsc::UnboundedSender<f32>>,
        ) -> CacheResult<String> {
            if let Some(message) = self.fail.lock().unwrap().clone() {
                return Err(CacheError::Storage(message));
            }
            if let Some(tx) = progress {
                let _ = tx.send(0.5);
                let _ = tx.send(1.0);
            }
            self.puts.lock().unwrap().push(RecordedPut {
                path: path.to_string(),
                bytes,
                content_type: content_type.to_string(),
            });
            Ok(Self::public_url(path))
        }
    }
}
