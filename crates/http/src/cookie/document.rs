//! Browser cookie jar over `document.cookie`

use super::{Cookie, CookieStore, parse_cookie_header};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Cookie store that reads and writes the page's `document.cookie`
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCookieJar;

impl DocumentCookieJar {
    /// Create a handle to the page's cookie jar
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn html_document() -> Option<HtmlDocument> {
    web_sys::window()?
        .document()?
        .dyn_into::<HtmlDocument>()
        .ok()
}

impl CookieStore for DocumentCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let header = html_document()?.cookie().ok()?;
        parse_cookie_header(&header, name)
    }

    fn set(&self, cookie: Cookie) {
        let Some(document) = html_document() else {
            return;
        };
        if document.set_cookie(&cookie.to_cookie_string()).is_err() {
            tracing::warn!(name = %cookie.name, "browser rejected cookie write");
        }
    }
}
