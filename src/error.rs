//! Error types shared by the API client, guards and configuration.
//!
//! ERROR HANDLING
//! ==============
//! `ApiError::TokenInvalid` is the only kind that crosses from the API client
//! into a route guard by type. Everything else is either propagated unchanged
//! or swallowed and reported at the session context boundary.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

// =============================================================================
// API ERRORS
// =============================================================================

/// Errors produced by backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the session token while running server-side.
    #[error("session token rejected by the backend")]
    TokenInvalid,

    /// The backend answered with a non-success HTTP status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connection, DNS, etc.).
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be decoded into the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status attached to the failure, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenInvalid => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Request(_) | Self::Parse(_) | Self::HttpClientBuild(_) => None,
        }
    }
}

/// Lets a route guard recognise "the token itself is unusable" in whatever
/// error type a page loader returns.
pub trait TokenInvalidity {
    fn is_token_invalid(&self) -> bool;
}

impl TokenInvalidity for ApiError {
    fn is_token_invalid(&self) -> bool {
        matches!(self, Self::TokenInvalid)
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors produced while reading configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
