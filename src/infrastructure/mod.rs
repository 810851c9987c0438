//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Cache update event broadcasting.
pub mod events;
/// Image caching and loading pipeline.
pub mod image;
/// Object storage adapters.
pub mod storage;

pub use config::{AppConfig, CacheConfig, ConfigError, LogLevel, StorageConfig};
pub use events::{CacheEvent, CacheEventBus};
pub use self::image::{
    CacheCoordinator, CacheStats, DiskImageCache, HttpImageFetcher, MemoryImageCache, bust_url,
};
pub use storage::HttpObjectStore;
