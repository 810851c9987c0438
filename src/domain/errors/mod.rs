//! Error types for the domain layer.

mod auth_error;
mod store_error;

pub use auth_error::AuthError;
pub use store_error::StoreError;
