//! Profile and linked-account endpoints

use super::{ApiClient, error::ClientError, request::ApiRequest};
use taskdash_core::{LinkedAccount, OAuthLinkUrl, SetPasswordRequest, User, UserUpdate};

impl ApiClient {
    /// Change profile fields or the password.
    ///
    /// Only the fields set in `update` are sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with the server's message (or
    /// "Failed to update profile") when the change is rejected.
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User, ClientError> {
        let request = ApiRequest::patch("/auth/me")
            .json(update)?
            .fallback_message("Failed to update profile");
        let user = self.fetch(request).await?;
        tracing::info!(
            password_changed = update.new_password.is_some(),
            "updated profile"
        );
        Ok(user)
    }

    /// Give an OAuth-only account a password for form login
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn set_password(&self, password: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/auth/set-password")
            .json(&SetPasswordRequest {
                password: password.to_string(),
            })?
            .fallback_message("Failed to set password");
        self.request::<serde_json::Value>(request).await?;
        tracing::info!("password set");
        Ok(())
    }

    /// OAuth identities linked to the signed-in user
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn linked_accounts(&self) -> Result<Vec<LinkedAccount>, ClientError> {
        Ok(self
            .request(ApiRequest::get("/auth/oauth/linked"))
            .await?
            .unwrap_or_default())
    }

    /// Provider URL that links `provider` to the signed-in account.
    ///
    /// Unlike [`oauth_authorize_url`](Self::oauth_authorize_url) this is
    /// asked of the backend, because the link flow is tied to the session.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn link_oauth_url(&self, provider: &str) -> Result<String, ClientError> {
        let path = format!("/auth/oauth/{}/link", urlencoding::encode(provider));
        let link: OAuthLinkUrl = self
            .fetch(ApiRequest::get(path).fallback_message("Failed to link account"))
            .await?;
        Ok(link.authorization_url)
    }

    /// Detach the linked OAuth identity
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn unlink_oauth(&self) -> Result<(), ClientError> {
        self.request::<serde_json::Value>(
            ApiRequest::delete("/auth/oauth/unlink").fallback_message("Failed to unlink account"),
        )
        .await?;
        tracing::info!("unlinked OAuth account");
        Ok(())
    }
}
