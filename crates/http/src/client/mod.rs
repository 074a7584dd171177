//! Taskdash API client

pub mod account;
pub mod auth;
pub mod error;
pub mod ml;
pub mod request;
pub mod retry;
pub mod tasks;

use crate::cookie::CookieStore;
use crate::session::SessionStore;
use bytes::Bytes;
use error::{ClientError, error_message};
use request::ApiRequest;
use reqwest::{Client, ClientBuilder};
use retry::{Attempt, CallState};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default user agent sent with every request
const USER_AGENT: &str = concat!("taskdash/", env!("CARGO_PKG_VERSION"));

/// Taskdash API client
///
/// Cloning is cheap: clones share the HTTP connection pool and the
/// session's cookie store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new client with default configuration and an in-memory session
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session whose tokens authenticate requests
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Issue an authenticated call and decode its JSON body.
    ///
    /// An empty success body yields `Ok(None)`. A 401 triggers at most one
    /// token refresh followed by one retry.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] when the session cannot be
    /// refreshed, [`ClientError::Api`] for other error statuses,
    /// [`ClientError::Serialization`] for malformed bodies and
    /// [`ClientError::Transport`] for network failures.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Option<T>, ClientError> {
        let response = self.send(&request).await?;
        decode_body(response).await
    }

    /// Like [`request`](Self::request), for endpoints that always return a body
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request), plus [`ClientError::EmptyResponse`].
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.request(request)
            .await?
            .ok_or(ClientError::EmptyResponse)
    }

    /// Issue an authenticated call and return the raw body
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request), without JSON decoding.
    pub async fn request_bytes(&self, request: ApiRequest) -> Result<Bytes, ClientError> {
        let response = self.send(&request).await?;
        Ok(response.bytes().await?)
    }

    /// Drive one call through the refresh-and-retry state machine
    async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let mut state = CallState::Requesting(Attempt::First);

        loop {
            state = match state {
                CallState::Requesting(attempt) => {
                    let bearer = self.session.access_token();
                    let response = self.dispatch(request, bearer.as_deref(), attempt).await?;
                    CallState::on_response(attempt, response.status(), response, || {
                        self.session.refresh_token()
                    })
                }
                CallState::Refreshing { refresh_token } => {
                    let refreshed = match self.refresh_with(&refresh_token).await {
                        Ok(_) => true,
                        Err(e) => {
                            tracing::warn!(error = %e, "token refresh failed");
                            false
                        }
                    };
                    CallState::on_refresh(refreshed)
                }
                CallState::Done(response) => return Ok(response),
                CallState::Failed(response) => {
                    return Err(error_from_response(response, request.fallback()).await);
                }
                CallState::SessionExpired => {
                    tracing::info!("session expired, clearing stored tokens");
                    self.session.clear();
                    return Err(ClientError::SessionExpired);
                }
            };
        }
    }

    /// Send a single attempt with no refresh handling
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
        attempt: Attempt,
    ) -> Result<reqwest::Response, ClientError> {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            ?attempt,
            authenticated = bearer.is_some(),
            "sending request"
        );

        let response = request
            .build(&self.client, &self.base_url, bearer)?
            .send()
            .await?;

        tracing::debug!(status = response.status().as_u16(), path = request.path(), "received response");
        Ok(response)
    }

    /// Send a call outside the retry wrapper and decode its body.
    ///
    /// Used by the calls that establish or tear down the session.
    async fn send_once<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Option<T>, ClientError> {
        let response = self.dispatch(request, bearer, Attempt::First).await?;
        if response.status().is_success() {
            decode_body(response).await
        } else {
            Err(error_from_response(response, request.fallback()).await)
        }
    }
}

/// Read a success body as text; empty means `None`, anything else is JSON
async fn decode_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Option<T>, ClientError> {
    let text = response.text().await?;
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

/// Turn an error response into an API error, falling back to `fallback`
/// when the body has no readable message
async fn error_from_response(response: reqwest::Response, fallback: &str) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
    ClientError::from_status(status, message)
}

/// Builder for `ApiClient`
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    session: Option<SessionStore>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use an existing session store
    #[must_use]
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Keep session tokens in the given cookie store
    #[must_use]
    pub fn cookie_store(self, cookies: Arc<dyn CookieStore>) -> Self {
        self.session(SessionStore::new(cookies))
    }

    /// Set the request timeout (ignored on wasm32)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was given or the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder =
            client_builder.user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            session: self.session.unwrap_or_else(SessionStore::in_memory),
        })
    }
}
