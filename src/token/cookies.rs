//! Token store over a server request/response cookie pair.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use std::sync::{Arc, Mutex, PoisonError};

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

use super::{CookieOptions, TOKEN_COOKIE, TOKEN_PATH, TokenStore, non_empty};

/// Cookies of one server request.
///
/// Reads come from the request's `Cookie` header; writes and removals
/// accumulate in the jar and reach the client once [`RequestCookies::jar`] is
/// returned as part of the response. Clones share the same jar, so a loader
/// and its guard observe each other's changes within a request.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    jar: Arc<Mutex<CookieJar>>,
}

impl RequestCookies {
    #[must_use]
    pub fn new(jar: CookieJar) -> Self {
        Self { jar: Arc::new(Mutex::new(jar)) }
    }

    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(CookieJar::from_headers(headers))
    }

    /// Snapshot of the jar, including pending `Set-Cookie` changes.
    #[must_use]
    pub fn jar(&self) -> CookieJar {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *jar);
        *jar = f(current);
    }
}

impl TokenStore for RequestCookies {
    fn read(&self) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        non_empty(jar.get(TOKEN_COOKIE).map(Cookie::value))
    }

    fn write(&self, token: &str, options: CookieOptions) {
        let cookie = Cookie::build((TOKEN_COOKIE, token.to_owned()))
            .path(options.path)
            .max_age(Duration::seconds(options.max_age_secs));
        self.update(|jar| jar.add(cookie));
    }

    fn destroy(&self) {
        self.update(|jar| jar.remove(Cookie::build((TOKEN_COOKIE, "")).path(TOKEN_PATH)));
    }
}
