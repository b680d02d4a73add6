//! Token-bound REST client with an authorization-failure interceptor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The same client serves server-side page loaders and in-browser calls. The
//! execution mode is fixed at construction and selects what a `401` means:
//!
//! - `Browser`: the tab signs out through the shared [`SessionLifecycle`] and
//!   the caller still receives the original `401` error.
//! - `Server`: no window to navigate, so the failure becomes
//!   [`ApiError::TokenInvalid`] for the route guard to act on.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionLifecycle;
use crate::token::TokenStore;

/// Where the client runs, and therefore how it recovers from a `401`.
#[derive(Debug, Clone)]
pub enum ExecutionMode {
    /// Inside a browser tab; holds the sign-out capability.
    Browser(SessionLifecycle),
    /// Inside a server render pass.
    Server,
}

/// `Authorization` header value for `token`. No token, no header.
#[must_use]
pub fn bearer_header(token: Option<&str>) -> Option<String> {
    token.map(|token| format!("Bearer {token}"))
}

/// HTTP client bound to a session token.
pub struct ApiClient {
    base_url: String,
    mode: ExecutionMode,
    token: RwLock<Option<String>>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client bound to whatever token `store` currently holds.
    pub fn create(
        config: &ClientConfig,
        store: &dyn TokenStore,
        mode: ExecutionMode,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            mode,
            token: RwLock::new(store.read()),
            transport,
        }
    }

    /// Browser-mode client reading the lifecycle's own token slot.
    pub fn browser(config: &ClientConfig, lifecycle: SessionLifecycle, transport: Arc<dyn HttpTransport>) -> Self {
        let store = lifecycle.store().clone();
        Self::create(config, store.as_ref(), ExecutionMode::Browser(lifecycle), transport)
    }

    /// Server-mode client for one request's cookies.
    pub fn server(config: &ClientConfig, store: &dyn TokenStore, transport: Arc<dyn HttpTransport>) -> Self {
        Self::create(config, store, ExecutionMode::Server, transport)
    }

    #[must_use]
    pub fn mode(&self) -> &ExecutionMode {
        &self.mode
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current default `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        bearer_header(self.token().as_deref())
    }

    /// Bind subsequent requests to `token`.
    pub fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    /// Drop the default `Authorization` header.
    pub fn clear_token(&self) {
        self.token.write().unwrap_or_else(PoisonError::into_inner).take();
    }

    // =========================================================================
    // REQUESTS
    // =========================================================================

    /// `GET path`, decoding a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the intercepted failure, or `ApiError::Parse` on a malformed body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::Get, path, None).await?;
        decode(&response)
    }

    /// `POST path` with a JSON body, decoding a JSON response.
    ///
    /// # Errors
    ///
    /// Returns the intercepted failure, or `ApiError::Parse` on a malformed body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::Post, path, Some(encode(body)?)).await?;
        decode(&response)
    }

    /// `POST path` with a JSON body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns the intercepted failure.
    pub async fn post_discard<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::Post, path, Some(encode(body)?)).await?;
        Ok(())
    }

    async fn send(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<ApiResponse, ApiError> {
        let token = self.token();
        let request = ApiRequest {
            method,
            url: format!("{}{path}", self.base_url),
            authorization: bearer_header(token.as_deref()),
            body,
        };
        let result = self.transport.send(request).await;
        self.intercept(token.as_deref(), result)
    }

    /// Response interceptor. `sent_token` is the token the request carried.
    fn intercept(
        &self,
        sent_token: Option<&str>,
        result: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        let response = result?;
        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 {
            match &self.mode {
                ExecutionMode::Browser(lifecycle) => {
                    if lifecycle.invalidate(sent_token) {
                        self.clear_token();
                    }
                }
                ExecutionMode::Server => {
                    tracing::warn!("backend rejected session token during server render");
                    return Err(ApiError::TokenInvalid);
                }
            }
        }

        Err(ApiError::Status { status: response.status, body: response.body })
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Parse(e.to_string()))
}
