use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

pub const PROFILE_PATH: &str = "/account/profile";
pub const PASSWORD_PATH: &str = "/account/password";

/// Public profile of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Clone)]
pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.client.get(PROFILE_PATH).await
    }

    /// Returns the saved profile when the backend echoes it back
    pub async fn update_profile(&self, profile: &Profile) -> Result<Option<Profile>, ApiError> {
        self.client.post_write(PROFILE_PATH, profile).await
    }

    /// The response body carries nothing the client needs.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let body = serde_json::to_value(change).map_err(ApiError::Encode)?;
        self.client
            .send(Method::POST, PASSWORD_PATH, Some(body))
            .await?;
        Ok(())
    }
}
