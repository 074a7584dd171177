//! Token storage for the signed-in session
//!
//! The access and refresh tokens live in two separate cookies with their
//! own lifetimes. Nothing is cached in memory: every read goes through the
//! cookie store, so a token cleared by another handle is seen immediately.

use crate::cookie::{Cookie, CookieStore, MemoryCookieJar};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Cookie holding the bearer access token
pub const ACCESS_TOKEN_COOKIE: &str = "auth_token";

/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Access token cookie lifetime in days
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 1;

/// Refresh token cookie lifetime in days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Access and refresh tokens backed by an injectable cookie store
#[derive(Clone)]
pub struct SessionStore {
    cookies: Arc<dyn CookieStore>,
}

impl SessionStore {
    /// Create a session store over any cookie backend
    pub fn new(cookies: Arc<dyn CookieStore>) -> Self {
        Self { cookies }
    }

    /// Session store over a fresh in-memory jar
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCookieJar::new()))
    }

    /// The underlying cookie store
    #[must_use]
    pub fn cookies(&self) -> &Arc<dyn CookieStore> {
        &self.cookies
    }

    /// Current access token
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.cookies.get(ACCESS_TOKEN_COOKIE)
    }

    /// Current refresh token
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.cookies.get(REFRESH_TOKEN_COOKIE)
    }

    /// Whether an access token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Replace the access token, leaving the refresh token alone
    pub fn set_access_token(&self, token: &str) {
        self.cookies.set(Cookie::persistent(
            ACCESS_TOKEN_COOKIE,
            token,
            ACCESS_TOKEN_TTL_DAYS,
        ));
    }

    /// Store a freshly issued token pair.
    ///
    /// A missing refresh token leaves any stored one untouched.
    pub fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        self.set_access_token(access_token);
        if let Some(refresh_token) = refresh_token {
            self.cookies.set(Cookie::persistent(
                REFRESH_TOKEN_COOKIE,
                refresh_token,
                REFRESH_TOKEN_TTL_DAYS,
            ));
        }
    }

    /// Forget both tokens
    pub fn clear(&self) {
        self.cookies.remove(ACCESS_TOKEN_COOKIE);
        self.cookies.remove(REFRESH_TOKEN_COOKIE);
    }

    /// Adopt the tokens an OAuth or registration callback put in the URL
    /// query (`?access_token=...&refresh_token=...`).
    ///
    /// Returns `false` and leaves the session untouched when the URL carries
    /// no access token.
    pub fn adopt_callback(&self, callback: &Url) -> bool {
        let mut access_token = None;
        let mut refresh_token = None;
        for (key, value) in callback.query_pairs() {
            match key.as_ref() {
                "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
                "refresh_token" if !value.is_empty() => refresh_token = Some(value.into_owned()),
                _ => {}
            }
        }

        match access_token {
            Some(access_token) => {
                self.set_tokens(&access_token, refresh_token.as_deref());
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("has_refresh_token", &self.refresh_token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn store() -> (Arc<MemoryCookieJar>, SessionStore) {
        let jar = Arc::new(MemoryCookieJar::new());
        let session = SessionStore::new(jar.clone());
        (jar, session)
    }

    #[test]
    fn tokens_round_trip_through_cookies() {
        let (jar, session) = store();
        session.set_tokens("access", Some("refresh"));

        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).as_deref(), Some("access"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn cookie_lifetimes_are_one_and_seven_days() {
        let (jar, session) = store();
        let now = Utc::now();
        session.set_tokens("access", Some("refresh"));

        let access = jar.cookie(ACCESS_TOKEN_COOKIE).unwrap();
        let refresh = jar.cookie(REFRESH_TOKEN_COOKIE).unwrap();
        assert!(((access.expires - now) - Duration::days(1)).num_seconds().abs() <= 5);
        assert!(((refresh.expires - now) - Duration::days(7)).num_seconds().abs() <= 5);
        assert!(access.secure && refresh.secure);
    }

    #[test]
    fn refreshing_access_keeps_refresh_token() {
        let (_, session) = store();
        session.set_tokens("old", Some("refresh"));
        session.set_tokens("new", None);

        assert_eq!(session.access_token().as_deref(), Some("new"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh"));
    }

    #[test]
    fn clear_removes_both() {
        let (jar, session) = store();
        session.set_tokens("access", Some("refresh"));
        session.clear();

        assert!(jar.names().is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn reads_are_not_cached() {
        let (jar, session) = store();
        session.set_access_token("access");
        jar.remove(ACCESS_TOKEN_COOKIE);
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn callback_tokens_are_adopted() {
        let (_, session) = store();
        let url = Url::parse("https://app.example/dashboard?access_token=a%2Bb&refresh_token=r").unwrap();

        assert!(session.adopt_callback(&url));
        assert_eq!(session.access_token().as_deref(), Some("a+b"));
        assert_eq!(session.refresh_token().as_deref(), Some("r"));
    }

    #[test]
    fn callback_without_access_token_is_ignored() {
        let (_, session) = store();
        let url = Url::parse("https://app.example/dashboard?refresh_token=r").unwrap();

        assert!(!session.adopt_callback(&url));
        assert_eq!(session.refresh_token(), None);
    }
}
