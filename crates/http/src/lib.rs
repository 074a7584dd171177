//! HTTP client and session manager for the taskdash backend
//!
//! [`ApiClient`] issues authenticated calls, keeping the access/refresh
//! token pair in an injectable [`CookieStore`] and resolving at most one
//! 401 per call by refreshing and retrying.

pub mod client;
pub mod consent;
pub mod cookie;
pub mod session;

pub use client::error::ClientError;
pub use client::request::ApiRequest;
pub use client::tasks::ListTasksQuery;
pub use client::{ApiClient, ApiClientBuilder};
pub use consent::{ConsentState, CookieConsent};
pub use cookie::{Cookie, CookieStore, FileCookieJar, MemoryCookieJar};
pub use session::SessionStore;

#[cfg(target_arch = "wasm32")]
pub use cookie::DocumentCookieJar;
