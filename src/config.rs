//! Configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_ROOT: &str = "target/site";

/// Settings for building API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root every request path is appended to, without trailing `/`.
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_owned() }
    }
}

impl ClientConfig {
    /// Build client config from environment variables.
    ///
    /// Optional:
    /// - `API_BASE_URL`: backend root, default `http://localhost:3333`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Self { api_base_url }
    }
}

/// Settings for the SSR host binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory whose `pkg/` holds the browser bundle.
    pub site_root: PathBuf,
    pub client: ClientConfig,
}

impl ServerConfig {
    /// Build server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: listen port, default 3000
    /// - `SITE_ROOT`: bundle output directory, default `target/site`
    /// - `API_BASE_URL`: see [`ClientConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reading through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw.clone() })?,
            None => DEFAULT_PORT,
        };
        let site_root = lookup("SITE_ROOT")
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SITE_ROOT), PathBuf::from);
        Ok(Self { port, site_root, client: ClientConfig::from_lookup(lookup) })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
