//! In-process cookie jar

use super::{Cookie, CookieStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Cookie jar that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, Cookie>>,
}

impl MemoryCookieJar {
    /// Create an empty jar
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full stored cookie, attributes included, if still valid
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = cookies.get(name)?.is_expired_at(Utc::now());
        if expired {
            cookies.remove(name);
            None
        } else {
            cookies.get(name).cloned()
        }
    }

    /// Names of all live cookies
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let now = Utc::now();
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = cookies
            .values()
            .filter(|cookie| !cookie.is_expired_at(now))
            .map(|cookie| cookie.name.clone())
            .collect();
        names.sort();
        names
    }
}

impl CookieStore for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|cookie| cookie.value)
    }

    fn set(&self, cookie: Cookie) {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookie.is_expired_at(Utc::now()) {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
    }

    fn remove(&self, name: &str) {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn set_get_remove() {
        let jar = MemoryCookieJar::new();
        jar.set(Cookie::persistent("auth_token", "abc", 1));
        assert_eq!(jar.get("auth_token").as_deref(), Some("abc"));

        jar.remove("auth_token");
        assert_eq!(jar.get("auth_token"), None);
    }

    #[test]
    fn expired_cookies_are_invisible() {
        let jar = MemoryCookieJar::new();
        let mut cookie = Cookie::persistent("auth_token", "abc", 1);
        cookie.expires = Utc::now() - Duration::seconds(1);
        jar.set(cookie);

        assert_eq!(jar.get("auth_token"), None);
        assert!(jar.names().is_empty());
    }

    #[test]
    fn writing_a_tombstone_deletes() {
        let jar = MemoryCookieJar::new();
        jar.set(Cookie::persistent("cookie_consent", "accepted", 365));
        jar.set(Cookie::expired("cookie_consent"));
        assert_eq!(jar.get("cookie_consent"), None);
    }
}
