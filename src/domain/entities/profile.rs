//! User profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A Stridelog user profile as persisted in the backend record store.
///
/// The pipeline itself only ever writes `profile_image_url`; the remaining
/// fields are carried so sign-in and profile reads round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    name: String,
    email: String,
    credential_hash: String,
    profile_image_url: Option<String>,
    height_cm: Option<f32>,
    weight_kg: Option<f32>,
    joined_at: DateTime<Utc>,
    is_current: bool,
}

impl UserProfile {
    /// Creates a profile as it exists right after signup.
    #[must_use]
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        credential_hash: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            credential_hash: credential_hash.into(),
            profile_image_url: None,
            height_cm: None,
            weight_kg: None,
            joined_at,
            is_current: false,
        }
    }

    /// Sets the profile image URL.
    #[must_use]
    pub fn with_profile_image_url(mut self, url: impl Into<String>) -> Self {
        self.profile_image_url = Some(url.into());
        self
    }

    /// Sets the physical attributes.
    #[must_use]
    pub const fn with_measurements(mut self, height_cm: f32, weight_kg: f32) -> Self {
        self.height_cm = Some(height_cm);
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Marks this profile as the signed-in user.
    #[must_use]
    pub const fn as_current(mut self) -> Self {
        self.is_current = true;
        self
    }

    /// Returns the user id.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the stored credential hash.
    #[must_use]
    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    /// Returns the profile image URL, if one has been uploaded.
    #[must_use]
    pub fn profile_image_url(&self) -> Option<&str> {
        self.profile_image_url.as_deref()
    }

    /// Updates the profile image URL in place. `None` clears it.
    pub fn set_profile_image_url(&mut self, url: Option<String>) {
        self.profile_image_url = url;
    }

    /// Returns height in centimetres, if recorded.
    #[must_use]
    pub const fn height_cm(&self) -> Option<f32> {
        self.height_cm
    }

    /// Returns weight in kilograms, if recorded.
    #[must_use]
    pub const fn weight_kg(&self) -> Option<f32> {
        self.weight_kg
    }

    /// Returns the signup timestamp.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Returns true if this is the signed-in user.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        self.is_current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UserProfile {
        UserProfile::new("u1", "Alex", "alex@example.com", "hash", Utc::now())
    }

    #[test]
    fn new_profile_has_no_image() {
        let profile = sample();
        assert_eq!(profile.profile_image_url(), None);
        assert!(!profile.is_current());
    }

    #[test]
    fn builders_set_fields() {
        let profile = sample()
            .with_profile_image_url("https://cdn/u1.jpg")
            .with_measurements(180.0, 75.5)
            .as_current();

        assert_eq!(profile.profile_image_url(), Some("https://cdn/u1.jpg"));
        assert_eq!(profile.height_cm(), Some(180.0));
        assert_eq!(profile.weight_kg(), Some(75.5));
        assert!(profile.is_current());
    }

    #[test]
    fn set_profile_image_url_clears() {
        let mut profile = sample().with_profile_image_url("https://cdn/u1.jpg");
        profile.set_profile_image_url(None);
        assert_eq!(profile.profile_image_url(), None);
    }
}
