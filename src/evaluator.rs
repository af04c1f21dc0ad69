// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Vulnerability Evaluator
 * Probes a CNAME-matched domain and checks the page against the provider's
 * "unclaimed" fingerprint
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use tracing::{debug, info};

use crate::errors::HttpError;
use crate::http_client::HttpClient;
use crate::registry::ProviderEntry;
use crate::types::{DomainScanResult, EVIDENCE_UNREACHABLE};

#[derive(Clone)]
pub struct Evaluator {
    http_client: HttpClient,
}

impl Evaluator {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Evaluate `domain` against one matched provider. Never fails: probe and
    /// pattern problems end up in the result's evidence.
    pub async fn evaluate(&self, domain: &str, cname: &str, entry: &ProviderEntry) -> DomainScanResult {
        let mut result = DomainScanResult::pending(domain, cname, entry.name());
        let url = format!("{}{}", entry.fingerprint.scheme(), domain);

        debug!("[Probe] Checking {} for {} fingerprint", url, entry.name());

        let response = match self.http_client.probe(&url).await {
            Ok(response) => response,
            Err(HttpError::BodyRead { reason, .. }) => {
                result.evidence = reason;
                return result;
            }
            Err(e) => {
                // A matched provider that cannot be reached at all is itself the signal
                debug!("[Probe] {} unreachable: {}", url, e);
                result.is_vulnerable = true;
                result.evidence = EVIDENCE_UNREACHABLE.to_string();
                info!("[ALERT] {} ({}) unreachable behind live CNAME {}", domain, entry.name(), cname);
                return result;
            }
        };

        match entry.content_regex() {
            Ok(re) => {
                if re.is_match(&response.body) {
                    result.is_vulnerable = true;
                    result.evidence = entry.fingerprint.content_pattern.clone();
                    info!(
                        "[ALERT] {} serves the unclaimed {} page (CNAME {})",
                        domain,
                        entry.name(),
                        cname
                    );
                }
            }
            Err(e) => {
                result.evidence = e.to_string();
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderRegistry;
    use crate::types::ProviderFingerprint;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GITHUB_PAGE: &str = "There isn't a GitHub Pages site here";

    fn registry(content_pattern: &str) -> ProviderRegistry {
        ProviderRegistry::new(vec![ProviderFingerprint::new(
            "github",
            "github\\.io$",
            content_pattern,
            true,
        )])
    }

    /// host:port of the mock server, used as the probed "domain"
    fn host_of(server: &MockServer) -> String {
        server.address().to_string()
    }

    #[tokio::test]
    async fn test_fingerprint_match_is_vulnerable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(format!("<h1>{}.</h1>", GITHUB_PAGE)))
            .mount(&mock_server)
            .await;

        let registry = registry(GITHUB_PAGE);
        let evaluator = Evaluator::new(HttpClient::new(10).unwrap());
        let result = evaluator
            .evaluate(&host_of(&mock_server), "foo.github.io", &registry.entries()[0])
            .await;

        assert_eq!(result.provider, "github");
        assert!(result.is_vulnerable);
        assert!(!result.is_taken_over);
        assert_eq!(result.evidence, GITHUB_PAGE);
    }

    #[tokio::test]
    async fn test_claimed_site_is_not_vulnerable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Welcome to my blog"))
            .mount(&mock_server)
            .await;

        let registry = registry(GITHUB_PAGE);
        let evaluator = Evaluator::new(HttpClient::new(10).unwrap());
        let result = evaluator
            .evaluate(&host_of(&mock_server), "foo.github.io", &registry.entries()[0])
            .await;

        assert!(!result.is_vulnerable);
        assert!(result.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_vulnerable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let registry = registry(GITHUB_PAGE);
        let evaluator = Evaluator::new(HttpClient::new(1).unwrap());
        let result = evaluator
            .evaluate(&host_of(&mock_server), "foo.github.io", &registry.entries()[0])
            .await;

        assert!(result.is_vulnerable);
        assert_eq!(result.evidence, EVIDENCE_UNREACHABLE);
    }

    #[tokio::test]
    async fn test_bad_content_pattern_becomes_evidence() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("anything"))
            .mount(&mock_server)
            .await;

        let registry = registry("(unclosed");
        let evaluator = Evaluator::new(HttpClient::new(10).unwrap());
        let result = evaluator
            .evaluate(&host_of(&mock_server), "foo.github.io", &registry.entries()[0])
            .await;

        assert!(!result.is_vulnerable);
        assert!(result.evidence.contains("invalid content pattern"));
    }
}
