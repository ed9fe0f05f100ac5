//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Per-host basic authentication from configured credentials
//! - Status mapping: 404/410 → not found, 401/403 → authentication,
//!   timeouts and connection failures → unreachable
//!
//! Requests are never retried here; callers may retry whole stages.

use crate::config::Credential;
use crate::error::RegistryError;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depshift/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    credentials: Vec<Credential>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RegistryError::Unreachable {
                package: String::new(),
                registry: "HTTP client".to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            credentials: Vec::new(),
        })
    }

    /// Create a client with the given timeout and the default User-Agent
    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        Self::with_config(timeout, DEFAULT_USER_AGENT)
    }

    /// Attach credentials used for matching hosts
    pub fn with_credentials(mut self, credentials: Vec<Credential>) -> Self {
        self.credentials = credentials;
        self
    }

    fn credential_for(&self, url: &str) -> Option<&Credential> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        self.credentials.iter().find(|c| c.host == host)
    }

    /// Perform a GET request and map failures into registry errors
    pub async fn get_with_context(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut request = self.client.get(url);
        if let Some(credential) = self.credential_for(url) {
            request = request.basic_auth(&credential.username, Some(&credential.password));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::timeout(package, registry)
            } else {
                RegistryError::unreachable(package, registry, e.to_string())
            }
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "registry response");

        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(RegistryError::package_not_found(package, registry))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RegistryError::AuthenticationError {
                    url: url.to_string(),
                    message: format!("HTTP {}", status),
                })
            }
            s if !s.is_success() => Err(RegistryError::unreachable(
                package,
                registry,
                format!("HTTP {}", status),
            )),
            _ => Ok(response),
        }
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self.get_with_context(url, package, registry).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: registry.to_string(),
                message: format!("failed to parse JSON: {}", e),
            })
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<String, RegistryError> {
        let response = self.get_with_context(url, package, registry).await?;
        response
            .text()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: registry.to_string(),
                message: format!("failed to read response body: {}", e),
            })
    }
}
