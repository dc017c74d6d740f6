//! Configuration for the FCP CLI.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_user_id() -> String {
    "demo".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// CLI configuration, loaded from environment variables over defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// FCP server URL (http or https).
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// User ID sent with server requests.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Optional bearer token for authenticated (write) requests.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            user_id: default_user_id(),
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads `FCP_SERVER_URL`, `FCP_USER_ID`, `FCP_AUTH_TOKEN` and
    /// `FCP_TIMEOUT_SECS`, falling back to defaults.
    pub fn load() -> crate::error::Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FCP_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(user_id) = std::env::var("FCP_USER_ID") {
            config.user_id = user_id;
        } else {
            warn!("FCP_USER_ID not set, using 'demo' user");
        }
        if let Ok(token) = std::env::var("FCP_AUTH_TOKEN") {
            if !token.is_empty() {
                config.auth_token = Some(token);
            }
        }
        if let Ok(timeout) = std::env::var("FCP_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| {
                crate::error::FcpError::Config(format!(
                    "FCP_TIMEOUT_SECS must be a positive integer, got '{}'",
                    timeout
                ))
            })?;
        }

        if is_insecure_url(&config.server_url) {
            warn!(
                url = config.server_url.as_str(),
                "Using insecure HTTP connection. Consider HTTPS for non-localhost URLs."
            );
        }

        Ok(config)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Whether a URL is plain HTTP to a non-localhost host.
pub(crate) fn is_insecure_url(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("http://") else {
        return false;
    };
    let host = if let Some(bracketed) = rest.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or_default()
    } else {
        rest.split(['/', ':']).next().unwrap_or_default()
    };
    !matches!(host, "localhost" | "127.0.0.1" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8080");
        assert_eq!(config.user_id, "demo");
        assert_eq!(config.auth_token, None);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"server_url": "https://fcp.example.com"}"#).unwrap();
        assert_eq!(config.server_url, "https://fcp.example.com");
        assert_eq!(config.user_id, "demo");
    }

    #[test]
    fn test_insecure_url_detection() {
        assert!(!is_insecure_url("http://localhost:8080"));
        assert!(!is_insecure_url("http://127.0.0.1/api"));
        assert!(!is_insecure_url("http://[::1]:8080"));
        assert!(!is_insecure_url("https://fcp.example.com"));
        assert!(is_insecure_url("http://fcp.example.com"));
        assert!(is_insecure_url("http://10.0.0.5:8080/api"));
    }
}
