//! Port definitions for external collaborators.

mod auth_port;
mod image_cache_port;
mod object_storage_port;
mod profile_store_port;

pub use auth_port::AuthPort;
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort, ImageFetchPort};
pub use object_storage_port::ObjectStoragePort;
pub use profile_store_port::ProfileStorePort;
