//! Browser adapters for the session layer (`hydrate` builds only).
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the session seams to the real tab: `document.cookie` for the token
//! slot, `window.location` for navigation, `fetch` (gloo-net) for transport.
//! The bundle's [`hydrate`] entry point runs the mount-time session check.

use std::sync::Arc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::wasm_bindgen;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::session::context::SessionContext;
use crate::session::{LogNotifier, Navigator, SessionLifecycle};
use crate::token::{self, CookieOptions, TOKEN_COOKIE, TokenStore};

/// Install the panic hook and route `tracing`/`log` output to the console.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Token slot in `document.cookie`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCookies;

fn html_document() -> Option<web_sys::HtmlDocument> {
    web_sys::window()?.document()?.dyn_into::<web_sys::HtmlDocument>().ok()
}

fn set_document_cookie(assignment: &str) {
    let Some(document) = html_document() else {
        tracing::warn!("no document; cookie not written");
        return;
    };
    if document.set_cookie(assignment).is_err() {
        tracing::warn!("document.cookie write rejected");
    }
}

impl TokenStore for DocumentCookies {
    fn read(&self) -> Option<String> {
        let cookies = html_document()?.cookie().ok()?;
        token::non_empty(token::find_cookie(&cookies, TOKEN_COOKIE))
    }

    fn write(&self, value: &str, options: CookieOptions) {
        set_document_cookie(&token::format_cookie(TOKEN_COOKIE, value, options));
    }

    fn destroy(&self) {
        set_document_cookie(&token::format_cookie(TOKEN_COOKIE, "", CookieOptions::removal()));
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Navigates by assigning `window.location.href`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// `fetch`-backed transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

#[async_trait::async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = match request.method {
            Method::Get => gloo_net::http::Request::get(&request.url),
            Method::Post => gloo_net::http::Request::post(&request.url),
        };
        if let Some(authorization) = &request.authorization {
            builder = builder.header("Authorization", authorization);
        }
        let response = match &request.body {
            Some(body) => {
                builder
                    .json(body)
                    .map_err(|e| ApiError::Request(e.to_string()))?
                    .send()
                    .await
            }
            None => builder.send().await,
        }
        .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Client config baked in at bundle build time.
fn bundle_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| match key {
        "API_BASE_URL" => option_env!("API_BASE_URL").map(str::to_owned),
        _ => None,
    })
}

/// Session wired to the real tab.
pub fn browser_session(config: &ClientConfig) -> SessionContext {
    let lifecycle = SessionLifecycle::new(Arc::new(DocumentCookies), Arc::new(LocationNavigator));
    SessionContext::new(config, lifecycle, Arc::new(LogNotifier), Arc::new(FetchTransport))
}

/// Bundle entry point, called by every server-rendered page once loaded.
///
/// Runs the mount-time session check: a stored token the backend no longer
/// accepts is destroyed and the tab returns to the sign-in page.
#[wasm_bindgen]
pub fn hydrate() {
    init_logging();
    let session = browser_session(&bundle_config());
    wasm_bindgen_futures::spawn_local(async move {
        session.mount().await;
        tracing::debug!(phase = ?session.phase(), "session mounted");
    });
}
