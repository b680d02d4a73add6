//! Seam between the API client and the HTTP library.
//!
//! DESIGN
//! ======
//! A transport only moves bytes: any HTTP status is a successful exchange.
//! Status interpretation (2xx vs 401 vs other) belongs to `ApiClient`, so the
//! interceptor logic is identical for every transport. Browser transports
//! produce `!Send` futures, hence the `?Send` variant under `hydrate`.

use crate::error::ApiError;

/// HTTP methods used by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL (base endpoint + path).
    pub url: String,
    /// `Authorization` header value, omitted when no token is bound.
    pub authorization: Option<String>,
    /// JSON body for `POST`.
    pub body: Option<serde_json::Value>,
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests over some HTTP implementation.
#[cfg_attr(feature = "hydrate", async_trait::async_trait(?Send))]
#[cfg_attr(not(feature = "hydrate"), async_trait::async_trait)]
pub trait HttpTransport: Send + Sync {
    /// Perform one exchange.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` when no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}
