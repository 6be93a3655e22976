//! Resolver Configuration Module
//!
//! Listen address, forum base URL and the fallback host used when a request
//! carries no authority. Loaded from environment variables with defaults
//! suitable for running behind a local reverse proxy.

use std::net::SocketAddr;

use fluxredir_core::{env_or, env_parse, ConfigError};

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the Discourse forum, always ending with `/`.
    /// Example: "https://forum.example.org/"
    pub forum_url: String,

    /// Address to listen on.
    pub bind: String,

    /// Port to listen on.
    pub port: u16,

    /// Authority used to rebuild the original request URL when neither the
    /// request target nor a `Host` header provides one.
    pub public_host: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forum_url: normalize_forum_url("https://forum.example.org/"),
            bind: "127.0.0.1".to_string(),
            port: 9009,
            public_host: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FLUXREDIR_FORUM_URL`: Discourse base URL (default: https://forum.example.org/)
    /// - `FLUXREDIR_BIND`: Listen address (default: 127.0.0.1)
    /// - `FLUXREDIR_PORT`: Listen port (default: 9009)
    /// - `FLUXREDIR_PUBLIC_HOST`: Fallback authority for provenance URLs
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let forum_url = normalize_forum_url(&env_or("FLUXREDIR_FORUM_URL", &defaults.forum_url));
        if !(forum_url.starts_with("https://") || forum_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "FLUXREDIR_FORUM_URL".to_string(),
                value: forum_url,
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }

        let public_host = std::env::var("FLUXREDIR_PUBLIC_HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        Ok(Self {
            forum_url,
            bind: env_or("FLUXREDIR_BIND", &defaults.bind),
            port: env_parse("FLUXREDIR_PORT", defaults.port)?,
            public_host,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "FLUXREDIR_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            })
    }
}

/// Make sure the forum URL ends with exactly one `/`.
pub fn normalize_forum_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.forum_url, "https://forum.example.org/");
        assert_eq!(config.port, 9009);
        assert_eq!(config.bind, "127.0.0.1");
        assert!(config.public_host.is_none());
    }

    #[test]
    fn test_normalize_forum_url() {
        assert_eq!(normalize_forum_url("https://bbs.example.org"), "https://bbs.example.org/");
        assert_eq!(normalize_forum_url("https://bbs.example.org/"), "https://bbs.example.org/");
        assert_eq!(normalize_forum_url("https://bbs.example.org///"), "https://bbs.example.org/");
        assert_eq!(
            normalize_forum_url(" https://example.org/forum/ "),
            "https://example.org/forum/"
        );
    }

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig::default();
        let addr = config.bind_addr().expect("default bind address parses");
        assert_eq!(addr.port(), 9009);

        let config = ApiConfig {
            bind: "not an ip".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }
}
