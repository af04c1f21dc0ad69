// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_RESOLVER: &str = "8.8.8.8:53";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_HEROKU_API_URL: &str = "https://api.heroku.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub takeover: TakeoverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScannerConfig {
    /// Number of domains scanned at the same time
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Resolver used for every top-level query
    #[serde(default = "default_resolver")]
    pub resolver: SocketAddr,

    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_dns_timeout")]
    pub dns_timeout_secs: u64,

    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_max_cname_hops")]
    pub max_cname_hops: usize,

    #[validate(range(min = 1024))]
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TakeoverConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub github_token: Option<String>,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default)]
    pub heroku_username: Option<String>,

    #[serde(default)]
    pub heroku_api_key: Option<String>,

    #[serde(default)]
    pub heroku_app_name: Option<String>,

    #[serde(default = "default_heroku_api_url")]
    pub heroku_api_url: String,
}

fn default_concurrency() -> usize {
    5
}

fn default_resolver() -> SocketAddr {
    SocketAddr::from(([8, 8, 8, 8], 53))
}

fn default_dns_timeout() -> u64 {
    5
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_cname_hops() -> usize {
    16
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_heroku_api_url() -> String {
    DEFAULT_HEROKU_API_URL.to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            resolver: default_resolver(),
            dns_timeout_secs: default_dns_timeout(),
            http_timeout_secs: default_http_timeout(),
            max_cname_hops: default_max_cname_hops(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: None,
        }
    }
}

impl ScannerConfig {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for TakeoverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            github_token: None,
            github_api_url: default_github_api_url(),
            heroku_username: None,
            heroku_api_key: None,
            heroku_app_name: None,
            heroku_api_url: default_heroku_api_url(),
        }
    }
}

impl TakeoverConfig {
    pub fn has_github(&self) -> bool {
        self.github_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_heroku(&self) -> bool {
        self.heroku_api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.heroku_app_name.as_deref().is_some_and(|a| !a.is_empty())
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for TakeoverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            match value {
                Some(v) if !v.is_empty() => "<redacted>",
                _ => "<unset>",
            }
        }

        f.debug_struct("TakeoverConfig")
            .field("enabled", &self.enabled)
            .field("github_token", &redact(&self.github_token))
            .field("github_api_url", &self.github_api_url)
            .field("heroku_username", &self.heroku_username)
            .field("heroku_api_key", &redact(&self.heroku_api_key))
            .field("heroku_app_name", &self.heroku_app_name)
            .field("heroku_api_url", &self.heroku_api_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.scanner.concurrency, 5);
        assert_eq!(config.scanner.resolver.to_string(), DEFAULT_RESOLVER);
        assert_eq!(config.scanner.http_timeout(), Duration::from_secs(10));
        assert!(!config.takeover.enabled);
        assert_eq!(config.takeover.github_api_url, DEFAULT_GITHUB_API_URL);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let takeover = TakeoverConfig {
            github_token: Some("ghp_secret".to_string()),
            heroku_api_key: Some("heroku-secret".to_string()),
            ..Default::default()
        };

        let printed = format!("{:?}", takeover);
        assert!(!printed.contains("ghp_secret"));
        assert!(!printed.contains("heroku-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_heroku_needs_key_and_app() {
        let mut takeover = TakeoverConfig {
            heroku_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(!takeover.has_heroku());

        takeover.heroku_app_name = Some("my-app".to_string());
        assert!(takeover.has_heroku());
    }

    #[test]
    fn test_range_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.scanner.concurrency = 0;
        assert!(config.validate().is_err());
    }
}
