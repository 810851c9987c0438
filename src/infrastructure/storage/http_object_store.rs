//! HTTP adapter for the cloud object store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::domain::ports::{CacheError, CacheResult, ObjectStoragePort};

/// Upload chunk size; progress is reported once per chunk.
const CHUNK_SIZE: usize = 64 * 1024;

/// Object store client that PUTs objects against an HTTP endpoint and
/// resolves them through a public download base URL.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    public_base: String,
}

impl HttpObjectStore {
    /// Creates a store client.
    ///
    /// `endpoint` receives PUT requests; `public_base` is the prefix under
    /// which uploaded objects are publicly resolvable.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        public_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: trim_trailing_slash(endpoint.into()),
            public_base: trim_trailing_slash(public_base.into()),
        }
    }

    /// Returns the public download URL for a storage path.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }
}

fn trim_trailing_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

/// Splits a payload into cheap reference-counted chunks.
fn chunks_of(bytes: &Bytes, size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len().div_ceil(size).max(1));
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + size).min(bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }
    if chunks.is_empty() {
        chunks.push(Bytes::new());
    }
    chunks
}

#[async_trait]
impl ObjectStoragePort for HttpObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        progress: Option<mpsc::UnboundedSender<f32>>,
    ) -> CacheResult<String> {
        let url = format!("{}/{}", self.endpoint, path);
        let total = bytes.len().max(1);
        debug!(url = %url, size = bytes.len(), "Uploading object");

        let sent = Arc::new(AtomicUsize::new(0));
        let body_stream = futures_util::stream::iter(chunks_of(&bytes, CHUNK_SIZE)).map(
            move |chunk| {
                let done = sent.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
                if let Some(tx) = &progress {
                    #[allow(clippy::cast_precision_loss)]
                    let _ = tx.send(done as f32 / total as f32);
                }
                Ok::<Bytes, std::convert::Infallible>(chunk)
            },
        );

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, bytes.len())
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await
            .map_err(|e| CacheError::Storage(format!("Upload request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::Storage(format!(
                "Upload rejected with HTTP {}",
                response.status()
            )));
        }

        let public = self.public_url(path);
        info!(url = %public, "Object uploaded");
        Ok(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_cleanly() {
        let store = HttpObjectStore::new(
            reqwest::Client::new(),
            "https://storage.stridelog.app/upload/",
            "https://cdn.stridelog.app/",
        );
        assert_eq!(
            store.public_url("profile_images/u1_1700000000.jpg"),
            "https://cdn.stridelog.app/profile_images/u1_1700000000.jpg"
        );
    }

    #[test]
    fn chunks_cover_payload_exactly() {
        let bytes = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 13]);
        let chunks = chunks_of(&bytes, CHUNK_SIZE);

        assert_eq!(chunks.len(), 3);
        let total: usize = chunks.iter().map(Bytes::len).sum();
        assert_eq!(total, bytes.len());
        assert_eq!(chunks[2].len(), 13);
    }

    #[test]
    fn empty_payload_yields_one_empty_chunk() {
        let chunks = chunks_of(&Bytes::new(), CHUNK_SIZE);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }
}
