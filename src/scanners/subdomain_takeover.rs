// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dns::DnsClient;
use crate::errors::ScannerResult;
use crate::evaluator::Evaluator;
use crate::registry::ProviderRegistry;
use crate::takeover::TakeoverDispatcher;
use crate::types::{DomainScanResult, EVIDENCE_DEAD_RECORD, EVIDENCE_MISBEHAVING_AUTHORITY};

/// Scans a single domain for takeover exposure.
///
/// Steps run strictly in order and each one can end the scan:
/// authority check, CNAME chain, CNAME apex check, provider evaluation, takeover.
#[derive(Clone)]
pub struct SubdomainTakeoverScanner {
    pub(crate) dns: Arc<DnsClient>,
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) evaluator: Evaluator,
    pub(crate) dispatcher: Arc<TakeoverDispatcher>,
    pub(crate) takeover_enabled: bool,
}

impl SubdomainTakeoverScanner {
    pub fn new(
        dns: Arc<DnsClient>,
        registry: Arc<ProviderRegistry>,
        evaluator: Evaluator,
        dispatcher: Arc<TakeoverDispatcher>,
        takeover_enabled: bool,
    ) -> Self {
        Self {
            dns,
            registry,
            evaluator,
            dispatcher,
            takeover_enabled,
        }
    }

    /// Results for `domain`, or the DNS error that ended its scan.
    /// A domain without a CNAME fails with `DnsError::NotFound`.
    pub async fn scan(&self, domain: &str) -> ScannerResult<Vec<DomainScanResult>> {
        if self.dns.authority_misbehaves(domain).await? {
            info!("[ALERT] {} has an authority answering REFUSED/SERVFAIL", domain);
            return Ok(vec![DomainScanResult::dns_finding(
                domain,
                "",
                EVIDENCE_MISBEHAVING_AUTHORITY,
            )]);
        }

        let cname = self.dns.resolve_cname_chain(domain).await?;

        if !self.dns.apex_resolves(&cname).await? {
            info!("[ALERT] {} points at dead record {}", domain, cname);
            return Ok(vec![DomainScanResult::dns_finding(
                domain,
                &cname,
                EVIDENCE_DEAD_RECORD,
            )]);
        }

        let matches = self.registry.matching_fingerprints(&cname);
        if matches.is_empty() {
            debug!("[Engine] {} -> {} matches no provider", domain, cname);
            return Ok(vec![DomainScanResult::undetermined(domain, &cname)]);
        }

        let mut results = Vec::with_capacity(matches.len());
        for entry in matches {
            let mut result = self.evaluator.evaluate(domain, &cname, entry).await;

            if self.takeover_enabled && result.is_vulnerable {
                self.try_takeover(&mut result).await;
            }

            results.push(result);
        }

        Ok(results)
    }

    async fn try_takeover(&self, result: &mut DomainScanResult) {
        match self.dispatcher.dispatch(&result.domain, &result.provider).await {
            Ok(taken) => result.mark_taken_over(taken),
            Err(e) => {
                warn!("[Takeover] {} via {} failed: {}", result.domain, result.provider, e);
                result.evidence = e.to_string();
            }
        }
    }
}
