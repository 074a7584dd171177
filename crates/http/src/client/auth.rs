//! Session endpoints
//!
//! Login, registration, refresh and logout establish or tear down the
//! session themselves, so they bypass the refresh-and-retry wrapper.

use super::{ApiClient, error::ClientError, request::ApiRequest};
use taskdash_core::{OAuthProviders, RefreshRequest, RegisterRequest, TokenResponse, User};
use url::Url;

impl ApiClient {
    /// Sign in with a username and password.
    ///
    /// Credentials are sent form-encoded to the token endpoint and the
    /// returned tokens are stored in the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with the server's message (or
    /// "Login failed") when the credentials are rejected.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let request = ApiRequest::post("/auth/token")
            .form([("username", username), ("password", password)])
            .fallback_message("Login failed");

        let tokens: TokenResponse = self
            .send_once(&request, None)
            .await?
            .ok_or(ClientError::EmptyResponse)?;

        self.session()
            .set_tokens(&tokens.access_token, tokens.refresh_token.as_deref());
        tracing::info!(username, "signed in");
        Ok(tokens)
    }

    /// Create an account. The new user still has to sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] when the backend rejects the registration.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, ClientError> {
        let request = ApiRequest::post("/auth/register")
            .json(registration)?
            .fallback_message("Registration failed");

        let user = self
            .send_once(&request, None)
            .await?
            .ok_or(ClientError::EmptyResponse)?;
        tracing::info!(username = %registration.username, "registered account");
        Ok(user)
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] when there is no refresh
    /// token, or the refresh endpoint's error.
    pub async fn refresh(&self) -> Result<TokenResponse, ClientError> {
        let refresh_token = self
            .session()
            .refresh_token()
            .ok_or(ClientError::SessionExpired)?;
        self.refresh_with(&refresh_token).await
    }

    /// Refresh with an explicit token and store the result
    pub(super) async fn refresh_with(&self, refresh_token: &str) -> Result<TokenResponse, ClientError> {
        let request = ApiRequest::post("/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })?
            .fallback_message("Token refresh failed");

        let tokens: TokenResponse = self
            .send_once(&request, None)
            .await?
            .ok_or(ClientError::EmptyResponse)?;

        self.session()
            .set_tokens(&tokens.access_token, tokens.refresh_token.as_deref());
        tracing::info!(
            rotated = tokens.refresh_token.is_some(),
            "refreshed access token"
        );
        Ok(tokens)
    }

    /// Sign out.
    ///
    /// The server is notified on a best-effort basis; any failure is logged
    /// and ignored. Local tokens are always cleared.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.session().refresh_token() {
            if let Err(e) = self.notify_logout(refresh_token).await {
                tracing::warn!(error = %e, "logout notification failed, clearing local session anyway");
            }
        }

        self.session().clear();
        tracing::info!("signed out");
    }

    async fn notify_logout(&self, refresh_token: String) -> Result<(), ClientError> {
        let request = ApiRequest::post("/auth/logout").json(&RefreshRequest { refresh_token })?;
        let bearer = self.session().access_token();
        self.send_once::<serde_json::Value>(&request, bearer.as_deref())
            .await?;
        Ok(())
    }

    /// The signed-in user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] when the session is gone.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.fetch(ApiRequest::get("/auth/me")).await
    }

    /// OAuth providers the backend has configured
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn oauth_providers(&self) -> Result<OAuthProviders, ClientError> {
        Ok(self
            .request(ApiRequest::get("/auth/oauth/providers"))
            .await?
            .unwrap_or_default())
    }

    /// URL that starts the OAuth flow for `provider`
    #[must_use]
    pub fn oauth_authorize_url(&self, provider: &str) -> String {
        format!(
            "{}/auth/oauth/{}",
            self.base_url(),
            urlencoding::encode(provider)
        )
    }

    /// Adopt the tokens carried by an OAuth callback URL
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCallback`] when the URL does not parse
    /// or has no access token.
    pub fn complete_oauth(&self, callback: &str) -> Result<(), ClientError> {
        let url = Url::parse(callback)
            .map_err(|e| ClientError::InvalidCallback(format!("{callback}: {e}")))?;

        if self.session().adopt_callback(&url) {
            tracing::info!("signed in from OAuth callback");
            Ok(())
        } else {
            Err(ClientError::InvalidCallback(
                "no access_token in callback URL".to_string(),
            ))
        }
    }

    /// Revoke every session of the signed-in user, then forget local tokens
    ///
    /// # Errors
    ///
    /// Returns the request's error; local tokens are kept in that case.
    pub async fn revoke_all_sessions(&self) -> Result<(), ClientError> {
        self.request::<serde_json::Value>(
            ApiRequest::post("/auth/revoke-all").fallback_message("Failed to revoke sessions"),
        )
        .await?;
        self.session().clear();
        tracing::info!("revoked all sessions");
        Ok(())
    }
}
