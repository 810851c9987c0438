//! Profile image update use case.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::entities::{UploadedImage, UserId};
use crate::domain::errors::StoreError;
use crate::domain::ports::{CacheError, ProfileStorePort};
use crate::infrastructure::image::CacheCoordinator;

/// Errors from the avatar update workflow.
#[derive(Debug, thiserror::Error)]
pub enum UpdateAvatarError {
    /// Encode, upload or cache failure.
    #[error(transparent)]
    Upload(#[from] CacheError),
    /// The new URL could not be persisted on the profile record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Uploads a new profile image and persists its URL on the user record.
#[derive(Clone)]
pub struct UpdateAvatarUseCase {
    coordinator: Arc<CacheCoordinator>,
    profile_store: Arc<dyn ProfileStorePort>,
}

impl UpdateAvatarUseCase {
    /// Creates new avatar update use case.
    #[must_use]
    pub const fn new(
        coordinator: Arc<CacheCoordinator>,
        profile_store: Arc<dyn ProfileStorePort>,
    ) -> Self {
        Self {
            coordinator,
            profile_store,
        }
    }

    /// Uploads `image` for `user_id` and records the resulting URL.
    ///
    /// The upload itself already invalidates and re-seeds the caches and
    /// broadcasts the cache-updated event; this use case only adds the
    /// profile record write.
    ///
    /// # Errors
    /// Upload errors surface verbatim; a failed record write leaves the
    /// uploaded object in place but reports [`UpdateAvatarError::Store`].
    pub async fn execute(
        &self,
        user_id: &UserId,
        image: Arc<image::DynamicImage>,
        progress: Option<mpsc::UnboundedSender<f32>>,
    ) -> Result<UploadedImage, UpdateAvatarError> {
        let uploaded = self.coordinator.upload(image, user_id, progress).await?;

        self.profile_store
            .set_profile_image_url(user_id, Some(&uploaded.url))
            .await
            .map_err(|e| {
                warn!(error = %e, "Uploaded image but failed to persist URL");
                e
            })?;

        info!(user = %user_id, url = %uploaded.url, "Profile image updated");

        Ok(uploaded)
    }
}
