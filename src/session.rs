use tracing::{debug, warn};

use crate::db::LocalStore;
use crate::error::ClientError;
use crate::models::UserProfile;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_DATA_KEY: &str = "userData";

/// Authentication token and last-known profile, kept from sign-in until logout.
#[derive(Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn save(&self, token: &str, profile: &UserProfile) -> Result<(), ClientError> {
        let profile = serde_json::to_string(profile)?;
        self.store
            .set_many(&[(AUTH_TOKEN_KEY, token), (USER_DATA_KEY, profile.as_str())])
            .await?;
        Ok(())
    }

    pub async fn load_token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.store.get(AUTH_TOKEN_KEY).await?)
    }

    /// A stored profile that no longer parses reads as no profile.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        let Some(raw) = self.store.get(USER_DATA_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable stored profile");
                Ok(None)
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.load_token().await, Ok(Some(_)))
    }

    /// Drops token and profile. Never fails the caller.
    pub async fn clear(&self) {
        match self.store.remove(&[AUTH_TOKEN_KEY, USER_DATA_KEY]).await {
            Ok(removed) => debug!(removed, "Session cleared"),
            Err(err) => warn!(error = %err, "Failed to clear local session"),
        }
    }
}
