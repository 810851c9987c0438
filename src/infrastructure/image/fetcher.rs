//! HTTP adapter for image retrieval.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};

use crate::domain::ports::{CacheError, CacheResult, ImageFetchPort};

/// Appends a cache-busting `t=<unix-timestamp>` query parameter.
///
/// The parameter exists solely to defeat intermediate HTTP caches; cache
/// tiers keep using the original URL as their key.
#[must_use]
pub fn bust_url(url: &str, timestamp: i64) -> String {
    if url.contains('?') {
        format!("{url}&t={timestamp}")
    } else {
        format!("{url}?t={timestamp}")
    }
}

/// Fetches image bytes over HTTP with a configurable timeout.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(timeout_secs: u64) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CacheError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, sharing its connection pool.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        debug!(url = %url, "Fetching image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Network(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::Network(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::Network(format!("Failed to read body: {e}")))
    }

    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let exists = response.status() == reqwest::StatusCode::OK;
                trace!(url = %url, exists = exists, "HEAD check");
                exists
            }
            Err(e) => {
                trace!(url = %url, error = %e, "HEAD check failed, treating as missing");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://cdn/x.jpg", 1700000000, "https://cdn/x.jpg?t=1700000000"; "plain url")]
    #[test_case("https://cdn/x.jpg?size=64", 1700000000, "https://cdn/x.jpg?size=64&t=1700000000"; "existing query")]
    #[test_case("https://cdn/x.jpg?", 42, "https://cdn/x.jpg?&t=42"; "trailing question mark")]
    fn bust_url_appends_timestamp(url: &str, ts: i64, expected: &str) {
        assert_eq!(bust_url(url, ts), expected);
    }

    #[test]
    fn bust_url_changes_between_timestamps() {
        let a = bust_url("https://cdn/x.jpg", 1);
        let b = bust_url("https://cdn/x.jpg", 2);
        assert_ne!(a, b);
    }
}
