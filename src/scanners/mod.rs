// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Takeover Scan Engine
 * Bounded-concurrency orchestration over a domain list
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod subdomain_takeover;

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::dns::{normalize, DnsClient};
use crate::errors::{ScannerError, ScannerResult};
use crate::evaluator::Evaluator;
use crate::http_client::HttpClient;
use crate::registry::ProviderRegistry;
use crate::takeover::TakeoverDispatcher;
use crate::types::{DomainFailure, DomainScanResult, ScanReport};

pub use subdomain_takeover::SubdomainTakeoverScanner;

/// Shared sink for a single run. Results and failures are only appended.
#[derive(Default)]
pub struct ResultAggregator {
    inner: Mutex<Aggregate>,
}

#[derive(Default)]
struct Aggregate {
    results: Vec<DomainScanResult>,
    failures: Vec<DomainFailure>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_results(&self, results: Vec<DomainScanResult>) {
        self.inner.lock().results.extend(results);
    }

    pub fn add_failure(&self, failure: DomainFailure) {
        self.inner.lock().failures.push(failure);
    }

    pub fn result_count(&self) -> usize {
        self.inner.lock().results.len()
    }

    /// Take everything collected so far
    fn drain(&self) -> (Vec<DomainScanResult>, Vec<DomainFailure>) {
        let aggregate = std::mem::take(&mut *self.inner.lock());
        (aggregate.results, aggregate.failures)
    }
}

pub struct ScanEngine {
    scanner: SubdomainTakeoverScanner,
    concurrency: usize,
}

impl ScanEngine {
    pub fn new(config: &AppConfig, registry: ProviderRegistry) -> Result<Self> {
        let dns = DnsClient::from_config(&config.scanner);
        let evaluator = Evaluator::new(HttpClient::from_config(&config.scanner)?);
        let dispatcher = TakeoverDispatcher::from_config(&config.takeover)?;

        if config.takeover.enabled && dispatcher.is_empty() {
            warn!("[Engine] Takeover enabled but no provider credentials configured");
        }

        Ok(Self {
            scanner: SubdomainTakeoverScanner::new(
                Arc::new(dns),
                Arc::new(registry),
                evaluator,
                Arc::new(dispatcher),
                config.takeover.enabled,
            ),
            concurrency: config.scanner.concurrency.max(1),
        })
    }

    /// Replace the DNS client, e.g. one built on a different transport
    pub fn with_dns(mut self, dns: DnsClient) -> Self {
        self.scanner.dns = Arc::new(dns);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: TakeoverDispatcher) -> Self {
        self.scanner.dispatcher = Arc::new(dispatcher);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn scan_domain(&self, domain: &str) -> ScannerResult<Vec<DomainScanResult>> {
        self.scanner.scan(&normalize(domain)).await
    }

    /// Scan every domain with at most `concurrency` in flight and wait for all of them.
    pub async fn scan_all<I>(&self, domains: I) -> ScannerResult<ScanReport>
    where
        I: IntoIterator<Item = String>,
    {
        let start = Instant::now();
        let started_at = Utc::now().to_rfc3339();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let aggregator = Arc::new(ResultAggregator::new());
        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::new();

        info!("[Engine] Starting scan with concurrency {}", self.concurrency);

        for raw in domains {
            let domain = normalize(&raw);
            if domain.is_empty() {
                continue;
            }

            // Wait for a free slot before taking the next domain
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ScannerError::TaskFailed(format!("worker pool closed: {}", e)))?;

            let scanner = self.scanner.clone();
            let sink = Arc::clone(&aggregator);
            let task_domain = domain.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                Self::run_domain(&scanner, &task_domain, &sink).await;
            });

            handles.push((domain, handle));
        }

        let domains_scanned = handles.len();

        for (domain, handle) in handles {
            if let Err(e) = handle.await {
                error!("[Engine] Scan task for {} died: {}", domain, e);
                aggregator.add_failure(DomainFailure {
                    error: ScannerError::TaskFailed(e.to_string()).to_string(),
                    domain,
                    not_found: false,
                });
            }
        }

        let (results, failures) = aggregator.drain();

        let cache_stats = self.scanner.dns.cache().stats();
        debug!(
            "[DNS] Authority cache: {} hits, {} misses ({:.1}% hit rate)",
            cache_stats.hits, cache_stats.misses, cache_stats.hit_rate
        );

        let report = ScanReport {
            results,
            failures,
            domains_scanned,
            started_at,
            completed_at: Utc::now().to_rfc3339(),
            duration: start.elapsed(),
        };

        info!(
            "[Engine] Scanned {} domains in {:.2}s: {} results, {} vulnerable, {} failures",
            report.domains_scanned,
            report.duration.as_secs_f64(),
            report.results.len(),
            report.vulnerable().count(),
            report.failures.len()
        );

        Ok(report)
    }

    async fn run_domain(scanner: &SubdomainTakeoverScanner, domain: &str, sink: &ResultAggregator) {
        debug!("[Engine] Scanning {}", domain);

        match scanner.scan(domain).await {
            Ok(results) => sink.add_results(results),
            Err(ScannerError::Dns(e)) if e.is_not_found() => {
                warn!("[Engine] {}", e);
                sink.add_failure(DomainFailure {
                    domain: domain.to_string(),
                    error: e.to_string(),
                    not_found: true,
                });
            }
            Err(e) => {
                error!("[Engine] Scan of {} failed: {}", domain, e);
                sink.add_failure(DomainFailure {
                    domain: domain.to_string(),
                    error: e.to_string(),
                    not_found: false,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_collects_everything() {
        let aggregator = ResultAggregator::new();
        aggregator.add_results(vec![
            DomainScanResult::undetermined("a.example.com", "x.example.net"),
            DomainScanResult::undetermined("b.example.com", "y.example.net"),
        ]);
        aggregator.add_failure(DomainFailure {
            domain: "c.example.com".to_string(),
            error: "CNAME not found for c.example.com".to_string(),
            not_found: true,
        });

        assert_eq!(aggregator.result_count(), 2);
        let (results, failures) = aggregator.drain();
        assert_eq!(results.len(), 2);
        assert_eq!(failures.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let aggregator = Arc::new(ResultAggregator::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let sink = Arc::clone(&aggregator);
            handles.push(tokio::spawn(async move {
                sink.add_results(vec![DomainScanResult::undetermined(
                    &format!("d{}.example.com", i),
                    "t.example.net",
                )]);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(aggregator.result_count(), 32);
    }

    #[test]
    fn test_engine_from_default_config() {
        let engine = ScanEngine::new(&AppConfig::default(), ProviderRegistry::default()).unwrap();
        assert_eq!(engine.concurrency(), 5);
    }
}
