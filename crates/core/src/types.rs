//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// The signed-in user as returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Provider the account is linked to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_provider: Option<String>,
    /// `false` for accounts created through OAuth that never set a password
    #[serde(default)]
    pub has_password: bool,
}

/// Body of `PATCH /auth/me`; only the fields that are set get changed
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl UserUpdate {
    /// Profile fields of `wanted` that differ from `current`.
    ///
    /// A `None` in `wanted` means "leave alone". An empty full name matches
    /// a user without one.
    #[must_use]
    pub fn changes(
        current: &User,
        username: Option<String>,
        email: Option<String>,
        full_name: Option<String>,
    ) -> Self {
        let current_name = current.full_name.as_deref().unwrap_or_default();
        Self {
            username: username.filter(|u| *u != current.username),
            email: email.filter(|e| *e != current.email),
            full_name: full_name.filter(|n| n != current_name),
            ..Self::default()
        }
    }

    /// Password change, verified against the current password
    #[must_use]
    pub fn password(current_password: String, new_password: String) -> Self {
        Self {
            current_password: Some(current_password),
            new_password: Some(new_password),
            ..Self::default()
        }
    }

    /// True when nothing would change
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.current_password.is_none()
            && self.new_password.is_none()
    }
}

// Passwords must never end up in logs.
impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("current_password", &self.current_password.as_ref().map(|_| "<redacted>"))
            .field("new_password", &self.new_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Body of `POST /auth/set-password` for OAuth-only accounts
#[derive(Clone, Serialize, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

/// An OAuth identity linked to the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<String>,
}

/// Response of `GET /auth/oauth/{provider}/link`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthLinkUrl {
    pub authorization_url: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token pair issued by `/auth/token` and `/auth/refresh`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// Tokens must never end up in logs.
impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Body of `/auth/refresh` and `/auth/logout`
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response of `GET /auth/oauth/providers`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProviders {
    #[serde(default)]
    pub providers: Vec<String>,
}
