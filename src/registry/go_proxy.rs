//! Go Module Proxy adapter
//!
//! Fetches module version information from a Go module proxy.
//! API endpoints:
//! - List versions: {proxy}/{module}/@v/list
//! - Latest (modules with only pseudo-versions): {proxy}/{module}/@latest

use crate::domain::Ecosystem;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::scheme::{version_scheme, GoVersion};
use crate::update::VersionInfo;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Public Go Module Proxy base URL
pub const GO_PROXY_URL: &str = "https://proxy.golang.org";

/// Go Module Proxy adapter
pub struct GoProxyAdapter {
    client: HttpClient,
    proxies: Vec<String>,
}

/// `@latest` response
#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(rename = "Version")]
    version: String,
}

/// Escape a module path for proxy URLs
///
/// Uppercase letters become `!` followed by the lowercase letter.
pub fn escape_module_path(module: &str) -> String {
    let mut escaped = String::with_capacity(module.len());
    for ch in module.chars() {
        if ch.is_uppercase() {
            escaped.push('!');
            escaped.extend(ch.to_lowercase());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

impl GoProxyAdapter {
    /// Create a new Go Proxy adapter using the public proxy
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            proxies: vec![GO_PROXY_URL.to_string()],
        }
    }

    /// Use `proxies` in order; an empty list keeps the public proxy
    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        let proxies: Vec<String> = proxies
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty() && p != "direct" && p != "off")
            .collect();
        if !proxies.is_empty() {
            self.proxies = proxies;
        }
        self
    }

    /// Build the URL for listing versions
    fn build_list_url(proxy: &str, module: &str) -> String {
        format!("{}/{}/@v/list", proxy, escape_module_path(module))
    }

    /// Build the URL for the latest version
    fn build_latest_url(proxy: &str, module: &str) -> String {
        format!("{}/{}/@latest", proxy, escape_module_path(module))
    }

    /// Parse a `@v/list` body into normalized versions
    fn parse_list(body: &str, proxy: &str) -> Vec<VersionInfo> {
        let scheme = version_scheme(Ecosystem::GoModules);
        body.lines()
            .map(str::trim)
            .filter(|line| GoVersion::parse(line).is_ok())
            .map(|line| VersionInfo::new(scheme.normalize(line), proxy))
            .collect()
    }

    async fn fetch_from(
        &self,
        proxy: &str,
        module: &str,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let body = self
            .client
            .get_text(
                &Self::build_list_url(proxy, module),
                module,
                self.registry_name(),
            )
            .await?;
        let versions = Self::parse_list(&body, proxy);
        if !versions.is_empty() {
            return Ok(versions);
        }

        // Modules without tags only have pseudo-versions
        let latest: LatestResponse = self
            .client
            .get_json(
                &Self::build_latest_url(proxy, module),
                module,
                self.registry_name(),
            )
            .await?;
        Ok(Self::parse_list(&latest.version, proxy))
    }
}

#[async_trait]
impl RegistryAdapter for GoProxyAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    async fn fetch_versions(&self, module: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let mut last_error = None;

        // GOPROXY semantics: fall through to the next proxy only on not found
        for proxy in &self.proxies {
            match self.fetch_from(proxy, module).await {
                Ok(versions) => {
                    debug!(module, proxy = proxy.as_str(), count = versions.len(), "listed versions");
                    return Ok(versions);
                }
                Err(e @ RegistryError::PackageNotFound { .. }) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::package_not_found(module, self.registry_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_proxy_adapter_ecosystem() {
        let adapter = GoProxyAdapter::new(HttpClient::new().unwrap());
        assert_eq!(adapter.ecosystem(), Ecosystem::GoModules);
        assert_eq!(adapter.registry_name(), "Go Proxy");
    }

    #[test]
    fn test_escape_module_path() {
        assert_eq!(escape_module_path("rsc.io/quote"), "rsc.io/quote");
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
    }

    #[test]
    fn test_build_list_url() {
        assert_eq!(
            GoProxyAdapter::build_list_url(GO_PROXY_URL, "github.com/Azure/azure-sdk-for-go"),
            "https://proxy.golang.org/github.com/!azure/azure-sdk-for-go/@v/list"
        );
        assert_eq!(
            GoProxyAdapter::build_latest_url(GO_PROXY_URL, "rsc.io/quote"),
            "https://proxy.golang.org/rsc.io/quote/@latest"
        );
    }

    #[test]
    fn test_with_proxies() {
        let adapter = GoProxyAdapter::new(HttpClient::new().unwrap()).with_proxies(vec![
            "https://goproxy.example.com/".to_string(),
            "direct".to_string(),
        ]);
        assert_eq!(adapter.proxies, vec!["https://goproxy.example.com"]);

        let adapter = GoProxyAdapter::new(HttpClient::new().unwrap()).with_proxies(Vec::new());
        assert_eq!(adapter.proxies, vec![GO_PROXY_URL]);
    }

    #[test]
    fn test_parse_list() {
        let body = "v1.5.2\nv1.4.0\n\nv1.5.0-rc.1\nnot-a-version\n";
        let versions = GoProxyAdapter::parse_list(body, GO_PROXY_URL);
        let names: Vec<&str> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(names, vec!["1.5.2", "1.4.0", "1.5.0-rc.1"]);
        assert!(versions.iter().all(|v| v.source_url == GO_PROXY_URL));
    }
}
