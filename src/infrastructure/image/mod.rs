//! Image pipeline infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Disk caching for persistence across restarts
//! - Cache-busted HTTP fetching
//! - The coordinator tying the tiers together

pub mod coordinator;
pub mod disk_cache;
pub mod fetcher;
pub mod memory_cache;

pub use coordinator::{CacheCoordinator, JPEG_QUALITY};
pub use disk_cache::{DEFAULT_MAX_CACHE_SIZE, DiskImageCache};
pub use fetcher::{HttpImageFetcher, bust_url};
pub use memory_cache::{CacheStats, MemoryImageCache};
