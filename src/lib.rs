//! # ordersystem
//!
//! Session and route-protection layer for the OrderSystem web front end.
//!
//! SYSTEM CONTEXT
//! ==============
//! The crate coordinates three collaborators: a persisted token slot
//! (`token`), an HTTP client bound to that token (`net`), and the server-side
//! page pipeline (`guard`, `pages`, `views`). The `session` context owns the
//! signed-in user and writes the token slot on sign-in: in the tab it
//! runs the mount-time check, and on the host it drives form submissions.
//!
//! FEATURES
//! ========
//! `ssr` (default) builds the axum host, Leptos page views, cookie-jar store
//! and reqwest transport. `hydrate` builds the browser bundle's entry point
//! and adapters. The two are exclusive; build the bundle with
//! `--no-default-features --features hydrate`.

#[cfg(all(feature = "ssr", feature = "hydrate"))]
compile_error!("features `ssr` and `hydrate` are exclusive; build the browser bundle with `--no-default-features --features hydrate`");

pub mod config;
pub mod error;
pub mod guard;
pub mod net;
pub mod session;
pub mod token;

#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub mod pages;
#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub mod views;

#[cfg(feature = "hydrate")]
pub mod browser;

#[cfg(test)]
pub(crate) mod test_support;

/// Route paths the session layer navigates and redirects to.
pub mod routes {
    /// Sign-in page; also where a dropped session lands.
    pub const SIGN_IN: &str = "/";
    /// Registration page.
    pub const SIGN_UP: &str = "/signup";
    /// Landing page for an authenticated user.
    pub const DASHBOARD: &str = "/dashboard";
    /// Product registration page.
    pub const PRODUCT: &str = "/product";
}
