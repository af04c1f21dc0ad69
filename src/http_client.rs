// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ScannerConfig;
use crate::errors::HttpError;

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 5;

/// Probe client for candidate takeover targets.
///
/// Certificate validation is off: dangling hosts routinely serve expired or
/// mismatched certificates and the probe only reads the page.
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_config(timeout_secs, DEFAULT_USER_AGENT, MAX_BODY_SIZE)
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        Self::with_config(config.http_timeout_secs, user_agent, config.max_body_bytes)
    }

    pub fn with_config(timeout_secs: u64, user_agent: &str, max_body_size: usize) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            max_body_size,
        })
    }

    /// GET `url` and read at most `max_body_size` bytes of the body.
    /// Any status code counts as a response; only transport failures are errors.
    pub async fn probe(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let start = Instant::now();

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::from_request(url, &e))?;

        let status_code = response.status().as_u16();

        let mut body_bytes: Vec<u8> = Vec::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| HttpError::BodyRead {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

            let Some(chunk) = chunk else { break };

            let remaining = self.max_body_size - body_bytes.len();
            if chunk.len() >= remaining {
                body_bytes.extend_from_slice(&chunk[..remaining]);
                debug!("[Probe] Body of {} truncated at {} bytes", url, self.max_body_size);
                break;
            }
            body_bytes.extend_from_slice(&chunk);
        }

        debug!(
            "[Probe] GET {} -> {} ({} bytes, {}ms)",
            url,
            status_code,
            body_bytes.len(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
        })
    }
}

/// What the evaluator matches content patterns against
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_reads_error_pages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("There isn't a GitHub Pages site here."),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(10).unwrap();
        let response = client.probe(&mock_server.uri()).await.unwrap();

        assert!(response.body.contains("GitHub Pages"));
    }

    #[tokio::test]
    async fn test_probe_truncates_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(4096)))
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(10, DEFAULT_USER_AGENT, 100).unwrap();
        let response = client.probe(&mock_server.uri()).await.unwrap();

        assert_eq!(response.body.len(), 100);
    }

    #[tokio::test]
    async fn test_probe_sends_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("user-agent", "tko-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(10, "tko-test/1.0", MAX_BODY_SIZE).unwrap();
        let response = client.probe(&mock_server.uri()).await.unwrap();
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn test_probe_timeout_is_unreachable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(1).unwrap();
        let err = client.probe(&mock_server.uri()).await.unwrap_err();

        assert!(matches!(err, HttpError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(2).unwrap();
        let err = client.probe(&format!("http://{}", addr)).await.unwrap_err();

        assert!(matches!(err, HttpError::Unreachable { .. }));
    }
}
