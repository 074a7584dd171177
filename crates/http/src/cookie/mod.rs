//! Cookie attribute policy and pluggable cookie stores
//!
//! Every cookie written by the client carries the same attributes:
//! `path=/`, `SameSite=Strict` and `Secure`, with an absolute `expires`
//! computed from a lifetime in days. Values are percent-encoded on write
//! and decoded on read.

mod file;
mod memory;

#[cfg(target_arch = "wasm32")]
mod document;

pub use file::FileCookieJar;
pub use memory::MemoryCookieJar;

#[cfg(target_arch = "wasm32")]
pub use document::DocumentCookieJar;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of the `expires` attribute (RFC 1123, always GMT)
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A cookie together with its expiry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub secure: bool,
}

impl Cookie {
    /// Path attribute applied to every cookie
    pub const PATH: &'static str = "/";

    /// `SameSite` attribute applied to every cookie
    pub const SAME_SITE: &'static str = "Strict";

    /// A secure cookie that expires `days` from now
    pub fn persistent(name: impl Into<String>, value: impl Into<String>, days: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: Utc::now() + Duration::days(days),
            secure: true,
        }
    }

    /// The tombstone written to delete a cookie: empty and expired at the epoch
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            expires: DateTime::<Utc>::UNIX_EPOCH,
            secure: false,
        }
    }

    /// Whether the cookie is no longer valid at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// Serialize in `document.cookie` assignment form
    #[must_use]
    pub fn to_cookie_string(&self) -> String {
        let mut cookie = format!(
            "{}={};expires={};path={};SameSite={}",
            self.name,
            urlencoding::encode(&self.value),
            self.expires.format(EXPIRES_FORMAT),
            Self::PATH,
            Self::SAME_SITE,
        );
        if self.secure {
            cookie.push_str(";Secure");
        }
        cookie
    }
}

// Cookie values are credentials; keep them out of debug output.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("expires", &self.expires)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Look up `name` in a `Cookie` header / `document.cookie` string
#[must_use]
pub fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    header.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(&prefix).map(|raw| {
            urlencoding::decode(raw).map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
        })
    })
}

/// Storage backend for the session and consent cookies.
///
/// Reads and writes are synchronous and infallible from the caller's
/// point of view, matching how a browser cookie jar behaves.
pub trait CookieStore: Send + Sync + fmt::Debug {
    /// Current value of a cookie, or `None` if it is absent or expired
    fn get(&self, name: &str) -> Option<String>;

    /// Store a cookie, replacing any previous value
    fn set(&self, cookie: Cookie);

    /// Delete a cookie
    fn remove(&self, name: &str) {
        self.set(Cookie::expired(name));
    }
}
