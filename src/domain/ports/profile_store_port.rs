//! Persistent profile store port definition.

use async_trait::async_trait;

use crate::domain::entities::{UserId, UserProfile};
use crate::domain::errors::StoreError;

/// Port for the structured-record store that persists user profiles.
///
/// The pipeline only ever reads profiles and writes the profile image URL
/// field; habit/workout/goal records are managed elsewhere.
#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    /// Fetches a profile by id.
    async fn fetch_profile(&self, id: &UserId) -> Result<UserProfile, StoreError>;

    /// Persists the profile image URL for a user. `None` clears it.
    async fn set_profile_image_url(
        &self,
        id: &UserId,
        url: Option<&str>,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory profile store for testing.
    #[derive(Default)]
    pub struct MockProfileStore {
        profiles: Mutex<HashMap<UserId, UserProfile>>,
    }

    impl MockProfileStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a profile.
        pub fn insert(&self, profile: UserProfile) {
            self.profiles
                .lock()
                .unwrap()
                .insert(profile.id().clone(), profile);
        }
    }

    #[async_trait]
    impl ProfileStorePort for MockProfileStore {
        async fn fetch_profile(&self, id: &UserId) -> Result<UserProfile, StoreError> {
            self.profiles
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::not_found(format!("user/{id}")))
        }

        async fn set_profile_image_url(
            &self,
            id: &UserId,
            url: Option<&str>,
        ) -> Result<(), StoreError> {
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles
                .get_mut(id)
                .ok_or_else(|| StoreError::not_found(format!("user/{id}")))?;
            profile.set_profile_image_url(url.map(String::from));
            Ok(())
        }
    }
}
