//! Cookie-consent flag
//!
//! Only acceptance is persisted. Declining is remembered for the lifetime
//! of this handle and is indistinguishable from "never asked" once the
//! handle is gone (e.g. after a page reload).

use crate::cookie::{Cookie, CookieStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cookie holding the consent flag
pub const CONSENT_COOKIE: &str = "cookie_consent";

/// Consent cookie lifetime in days
pub const CONSENT_TTL_DAYS: i64 = 365;

const ACCEPTED: &str = "accepted";

/// Observable consent state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    Unset,
    Accepted,
    Declined,
}

/// Reads and records the visitor's cookie consent
#[derive(Debug)]
pub struct CookieConsent {
    cookies: Arc<dyn CookieStore>,
    declined: AtomicBool,
}

impl CookieConsent {
    pub fn new(cookies: Arc<dyn CookieStore>) -> Self {
        Self {
            cookies,
            declined: AtomicBool::new(false),
        }
    }

    /// Whether consent has been given and persisted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.cookies.get(CONSENT_COOKIE).as_deref() == Some(ACCEPTED)
    }

    /// Whether a consent cookie of any value exists
    #[must_use]
    pub fn has_been_asked(&self) -> bool {
        self.cookies.get(CONSENT_COOKIE).is_some()
    }

    /// Current state, including an unpersisted decline
    #[must_use]
    pub fn state(&self) -> ConsentState {
        if self.is_accepted() {
            ConsentState::Accepted
        } else if self.declined.load(Ordering::Relaxed) {
            ConsentState::Declined
        } else {
            ConsentState::Unset
        }
    }

    /// Record the visitor's answer; only acceptance writes a cookie
    pub fn record(&self, accepted: bool) {
        if accepted {
            self.declined.store(false, Ordering::Relaxed);
            self.cookies
                .set(Cookie::persistent(CONSENT_COOKIE, ACCEPTED, CONSENT_TTL_DAYS));
        } else {
            self.declined.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryCookieJar;
    use chrono::{Duration, Utc};

    #[test]
    fn starts_unset() {
        let consent = CookieConsent::new(Arc::new(MemoryCookieJar::new()));
        assert_eq!(consent.state(), ConsentState::Unset);
        assert!(!consent.has_been_asked());
    }

    #[test]
    fn acceptance_persists_for_a_year() {
        let jar = Arc::new(MemoryCookieJar::new());
        let consent = CookieConsent::new(jar.clone());
        consent.record(true);

        let reloaded = CookieConsent::new(jar.clone());
        assert_eq!(reloaded.state(), ConsentState::Accepted);
        assert!(reloaded.has_been_asked());

        let cookie = jar.cookie(CONSENT_COOKIE).unwrap();
        let lifetime = cookie.expires - Utc::now();
        assert!((lifetime - Duration::days(365)).num_seconds().abs() <= 5);
    }

    #[test]
    fn decline_is_not_persisted() {
        let jar = Arc::new(MemoryCookieJar::new());
        let consent = CookieConsent::new(jar.clone());
        consent.record(false);
        assert_eq!(consent.state(), ConsentState::Declined);

        let reloaded = CookieConsent::new(jar);
        assert_eq!(reloaded.state(), ConsentState::Unset);
        assert!(!reloaded.has_been_asked());
    }
}
