//! Stridelog - client core for a fitness/habit tracker.
//!
//! This crate implements the profile image pipeline (memory and disk cache
//! tiers, cache-busted network fetching, upload with cache invalidation)
//! together with ports for the external identity provider, record store and
//! object storage.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "stridelog";
