//! Route guards for server-side page loaders.
//!
//! SYSTEM CONTEXT
//! ==============
//! A page loader runs once per server render and yields either props or a
//! redirect. Guards decide from the request's token store whether the loader
//! runs at all, and purge the token when the loader reports it invalid.
//! Guards only ever destroy the token, never create it, and never see the
//! in-memory user (that lives in the browser-side session context).
//!
//! ERROR HANDLING
//! ==============
//! Loader failures other than token invalidity are returned unchanged; the
//! host decides how to render them.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::future::Future;

use crate::error::TokenInvalidity;
use crate::routes;
use crate::token::TokenStore;

/// Redirect instruction produced by a loader or a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub destination: String,
    pub permanent: bool,
}

impl Redirect {
    #[must_use]
    pub fn temporary(destination: &str) -> Self {
        Self { destination: destination.to_owned(), permanent: false }
    }
}

/// Outcome of a page loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult<P> {
    Props(P),
    Redirect(Redirect),
}

/// Run `loader` only for a request carrying a session token.
///
/// - No token: redirect to the sign-in page without running the loader.
/// - Loader reports the token invalid: destroy it and redirect to sign-in.
///
/// # Errors
///
/// Returns any other loader error unchanged.
pub async fn require_auth<S, F, Fut, P, E>(store: &S, loader: F) -> Result<PageResult<P>, E>
where
    S: TokenStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<PageResult<P>, E>>,
    E: TokenInvalidity,
{
    if store.read().is_none() {
        tracing::debug!("no session token; redirecting to sign-in");
        return Ok(PageResult::Redirect(Redirect::temporary(routes::SIGN_IN)));
    }

    match loader().await {
        Err(err) if err.is_token_invalid() => {
            tracing::info!("purging rejected session token");
            store.destroy();
            Ok(PageResult::Redirect(Redirect::temporary(routes::SIGN_IN)))
        }
        other => other,
    }
}

/// Run `loader` only for a request without a session token; signed-in
/// visitors are sent to the dashboard instead.
///
/// # Errors
///
/// Returns the loader's error unchanged.
pub async fn require_guest<S, F, Fut, P, E>(store: &S, loader: F) -> Result<PageResult<P>, E>
where
    S: TokenStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<PageResult<P>, E>>,
{
    if store.read().is_some() {
        tracing::debug!("session token present; redirecting to dashboard");
        return Ok(PageResult::Redirect(Redirect::temporary(routes::DASHBOARD)));
    }
    loader().await
}

// =============================================================================
// AXUM RESPONSES
// =============================================================================

#[cfg(feature = "ssr")]
impl axum::response::IntoResponse for Redirect {
    fn into_response(self) -> axum::response::Response {
        if self.permanent {
            axum::response::Redirect::permanent(&self.destination).into_response()
        } else {
            axum::response::Redirect::temporary(&self.destination).into_response()
        }
    }
}

#[cfg(feature = "ssr")]
impl<P: axum::response::IntoResponse> axum::response::IntoResponse for PageResult<P> {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Props(props) => props.into_response(),
            Self::Redirect(redirect) => redirect.into_response(),
        }
    }
}
