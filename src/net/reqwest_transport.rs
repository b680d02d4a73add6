//! `reqwest`-backed transport used by server-side loaders.

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::ApiError;

/// Thin wrapper over a shared `reqwest::Client`.
///
/// No timeouts are configured: a hung backend hangs the render, matching the
/// browser client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying client fails to build (TLS init).
    pub fn new() -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        if let Some(authorization) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        tracing::debug!(url = %request.url, status, "backend response");
        Ok(ApiResponse { status, body })
    }
}
