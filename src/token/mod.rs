//! Persisted session-token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token lives in a single cookie readable from both a server request and
//! a browser tab. Each store implementation is bound to one execution context,
//! so callers pick the context by picking the store: [`MemoryTokenStore`] for
//! an in-process slot, `RequestCookies` for a server request/response pair
//! (`ssr`), `DocumentCookies` for a browser tab (`hydrate`).
//!
//! TRADE-OFFS
//! ==========
//! All operations are infallible. A failed cookie write is logged by the
//! implementation instead of aborting sign-out or page navigation.

#[cfg(feature = "ssr")]
mod cookies;
#[cfg(feature = "ssr")]
pub use cookies::RequestCookies;


use std::sync::{Mutex, PoisonError};

/// Cookie name of the session token.
pub const TOKEN_COOKIE: &str = "@nextauth.token";
/// Token lifetime: thirty days.
pub const TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;
/// Token cookie path; `/` makes it visible to every page.
pub const TOKEN_PATH: &str = "/";

/// Attributes attached to a token write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age_secs: i64,
    pub path: &'static str,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self { max_age_secs: TOKEN_MAX_AGE_SECS, path: TOKEN_PATH }
    }
}

impl CookieOptions {
    /// Attributes that expire the token cookie immediately.
    #[must_use]
    pub const fn removal() -> Self {
        Self { max_age_secs: 0, path: TOKEN_PATH }
    }
}

/// A single persisted key/value slot holding the session token.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when no session exists. Empty values count as absent.
    fn read(&self) -> Option<String>;

    /// Replace the slot with `token`.
    fn write(&self, token: &str, options: CookieOptions);

    /// Clear the slot. Must be a no-op when nothing is stored.
    fn destroy(&self);
}

/// Normalise a raw cookie value: empty means "no session".
pub(crate) fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.is_empty()).map(str::to_owned)
}

/// Value of cookie `name` in a `Cookie`-header style string (`a=1; b=2`).
#[must_use]
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// `Set-Cookie` style assignment for `name=value` with `options`.
#[must_use]
pub fn format_cookie(name: &str, value: &str, options: CookieOptions) -> String {
    format!("{name}={value}; Max-Age={}; Path={}", options.max_age_secs, options.path)
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// A stored token together with the attributes it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub value: String,
    pub options: CookieOptions,
}

/// Process-local token slot.
///
/// Stands in for the browser cookie jar in native builds and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token` using the default attributes.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.write(token, CookieOptions::default());
        store
    }

    /// Token and attributes as last written.
    #[must_use]
    pub fn stored(&self) -> Option<StoredToken> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        non_empty(slot.as_ref().map(|stored| stored.value.as_str()))
    }

    fn write(&self, token: &str, options: CookieOptions) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(StoredToken { value: token.to_owned(), options });
    }

    fn destroy(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
