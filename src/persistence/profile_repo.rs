//! User profile persistence (display name and generation preferences).

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::profile::{UserPreferences, UserProfile};
use crate::Result;

use super::kv_store::{decode_json, encode_json, KeyValueStore};

/// Store key holding the JSON user profile.
pub const USER_PROFILE_KEY: &str = "@skilltrail_user";

/// Repository for the single local user profile.
#[derive(Clone)]
pub struct ProfileRepo {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored profile, or the default profile when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_profile(&self) -> Result<UserProfile> {
        let Some(raw) = self.store.get_item(USER_PROFILE_KEY).await? else {
            return Ok(UserProfile::default());
        };
        match decode_json(USER_PROFILE_KEY, &raw) {
            Ok(profile) => Ok(profile),
            Err(err) => {
                warn!(%err, "malformed user profile replaced by defaults");
                Ok(UserProfile::default())
            }
        }
    }

    /// Generation preferences, defaulting to balanced depth and medium videos.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_preferences(&self) -> Result<UserPreferences> {
        Ok(self.get_profile().await?.preferences)
    }

    /// Update the display name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the read or write fails.
    pub async fn set_user_name(&self, name: &str) -> Result<UserProfile> {
        let mut profile = self.get_profile().await?;
        name.trim().clone_into(&mut profile.name);
        self.write(&profile).await?;
        Ok(profile)
    }

    /// Replace the generation preferences.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the read or write fails.
    pub async fn set_preferences(&self, preferences: UserPreferences) -> Result<UserProfile> {
        let mut profile = self.get_profile().await?;
        profile.preferences = preferences;
        self.write(&profile).await?;
        info!(?preferences, "user preferences updated");
        Ok(profile)
    }

    /// Forget the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the delete fails.
    pub async fn clear_user_data(&self) -> Result<()> {
        self.store.remove_item(USER_PROFILE_KEY).await?;
        info!("user profile cleared");
        Ok(())
    }

    async fn write(&self, profile: &UserProfile) -> Result<()> {
        let raw = encode_json(USER_PROFILE_KEY, profile)?;
        self.store.set_item(USER_PROFILE_KEY, raw).await
    }
}
