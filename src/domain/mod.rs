//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ImageKey, LoadedImage, UserId, UserProfile};
pub use errors::{AuthError, StoreError};
pub use ports::{CacheError, CacheResult};
