// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Takeover Scanner Error Types
 * Per-domain failures are isolated; only registry, input and config errors are fatal
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Top-level scanner error
#[derive(Error, Debug)]
pub enum ScannerError {
    /// DNS-level failure for a single domain
    #[error("DNS error: {0}")]
    Dns(#[from] DnsError),

    /// HTTP probe failure (usually converted to evidence, not raised)
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Takeover collaborator failure
    #[error("Takeover error: {0}")]
    Takeover(#[from] TakeoverError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider registry could not be loaded
    #[error("Registry error: {0}")]
    Registry(String),

    /// Domain source could not be read
    #[error("Input error: {0}")]
    Input(String),

    /// A domain task died before producing results
    #[error("Scan task failed: {0}")]
    TaskFailed(String),
}

/// DNS errors. `NotFound` is a classification, `Protocol` and `Timeout` are operational.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("CNAME not found for {domain}")]
    NotFound { domain: String },

    #[error("DNS protocol error from {server}: {reason}")]
    Protocol { server: SocketAddr, reason: String },

    #[error("DNS query to {server} timed out after {timeout:?}")]
    Timeout {
        server: SocketAddr,
        timeout: Duration,
    },
}

/// HTTP probe errors
#[derive(Error, Debug, Clone)]
pub enum HttpError {
    #[error("Can't reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Failed to read response body from {url}: {reason}")]
    BodyRead { url: String, reason: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Takeover collaborator errors
#[derive(Error, Debug, Clone)]
pub enum TakeoverError {
    #[error("{provider} takeover needs {what}")]
    MissingCredentials { provider: String, what: String },

    #[error("{provider} API returned {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} API rate limit hit")]
    RateLimited { provider: String },

    #[error("{provider} API request failed: {reason}")]
    Transport { provider: String, reason: String },
}

impl DnsError {
    /// Transport or format failure, as opposed to a "no such record" classification
    pub fn is_protocol(&self) -> bool {
        matches!(self, DnsError::Protocol { .. } | DnsError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DnsError::NotFound { .. })
    }
}

impl TakeoverError {
    pub fn transport(provider: &str, err: reqwest::Error) -> Self {
        TakeoverError::Transport {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }
}

impl HttpError {
    /// Convert a reqwest error raised while sending the request
    pub fn from_request(url: &str, err: &reqwest::Error) -> Self {
        if err.is_builder() {
            return HttpError::InvalidUrl {
                url: url.to_string(),
            };
        }

        let reason = if err.is_timeout() {
            format!("timed out ({})", err)
        } else if err.is_connect() {
            format!("connection failed ({})", err)
        } else {
            err.to_string()
        };

        HttpError::Unreachable {
            url: url.to_string(),
            reason,
        }
    }
}

/// Result type for scanner operations
pub type ScannerResult<T> = Result<T, ScannerError>;
