// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use hickory_resolver::proto::rr::RecordType;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::apex::{apex_of, normalize};
use super::transport::{DnsTransport, UdpTransport};
use crate::config::ScannerConfig;
use crate::dns_cache::AuthorityCache;
use crate::errors::DnsError;

const DNS_PORT: u16 = 53;

/// DNS health checks used by the takeover scan.
///
/// Top-level questions always go to the configured resolver; only the
/// authority probe talks to authoritative servers directly.
pub struct DnsClient {
    transport: Arc<dyn DnsTransport>,
    resolver: SocketAddr,
    max_cname_hops: usize,
    cache: AuthorityCache,
}

impl DnsClient {
    pub fn new(transport: Arc<dyn DnsTransport>, resolver: SocketAddr) -> Self {
        Self {
            transport,
            resolver,
            max_cname_hops: 16,
            cache: AuthorityCache::new(),
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        let transport = Arc::new(UdpTransport::new(config.dns_timeout()));
        Self::new(transport, config.resolver).with_max_cname_hops(config.max_cname_hops)
    }

    pub fn with_max_cname_hops(mut self, hops: usize) -> Self {
        self.max_cname_hops = hops.max(1);
        self
    }

    pub fn resolver(&self) -> SocketAddr {
        self.resolver
    }

    pub fn cache(&self) -> &AuthorityCache {
        &self.cache
    }

    /// Follow the CNAME chain of `domain` and return the last CNAME target seen.
    ///
    /// Fails with `NotFound` when the first answer holds no CNAME, and with a
    /// protocol error when the first exchange fails. Failures further down the
    /// chain end the walk and keep what was found so far.
    pub async fn resolve_cname_chain(&self, domain: &str) -> Result<String, DnsError> {
        let domain = normalize(domain);

        let first = self
            .transport
            .query(self.resolver, &domain, RecordType::CNAME)
            .await?;

        let mut last = match first.cname_for(&domain) {
            Some(target) => target.to_string(),
            None => return Err(DnsError::NotFound { domain }),
        };

        let mut seen = HashSet::from([domain.clone(), last.clone()]);

        for _ in 1..self.max_cname_hops {
            let response = match self
                .transport
                .query(self.resolver, &last, RecordType::CNAME)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    debug!("[DNS] CNAME chain for {} stopped at {}: {}", domain, last, e);
                    break;
                }
            };

            match response.cname_for(&last) {
                Some(next) if seen.insert(next.to_string()) => last = next.to_string(),
                Some(next) => {
                    warn!("[DNS] CNAME loop for {} at {} -> {}", domain, last, next);
                    break;
                }
                None => break,
            }
        }

        debug!("[DNS] {} -> CNAME {}", domain, last);
        Ok(last)
    }

    /// Whether the registrable apex of `name` still exists.
    /// Only an explicit NXDOMAIN counts as "does not exist".
    pub async fn apex_resolves(&self, name: &str) -> Result<bool, DnsError> {
        let apex = apex_of(name);
        let response = self
            .transport
            .query(self.resolver, &apex, RecordType::A)
            .await?;

        if response.is_nxdomain() {
            debug!("[DNS] Apex {} of {} is NXDOMAIN", apex, name);
            return Ok(false);
        }
        Ok(true)
    }

    /// Whether any authoritative server for `domain` answers SERVFAIL or REFUSED.
    ///
    /// Failures talking to an individual nameserver are logged and skipped.
    /// Failure to reach the resolver for the apex NS set is propagated.
    pub async fn authority_misbehaves(&self, domain: &str) -> Result<bool, DnsError> {
        let domain = normalize(domain);
        let apex = apex_of(&domain);

        let apex_nameservers = self.apex_nameservers(&apex).await?;
        if apex_nameservers.is_empty() {
            debug!("[DNS] No authoritative nameservers found for {}", apex);
            return Ok(false);
        }

        let nameservers = if domain == apex {
            apex_nameservers.to_vec()
        } else {
            let delegated = self.delegated_nameservers(&domain, &apex_nameservers).await;
            if delegated.is_empty() {
                apex_nameservers.to_vec()
            } else {
                delegated
            }
        };

        for nameserver in &nameservers {
            let Some(addr) = self.nameserver_addr(nameserver).await else {
                continue;
            };

            match self.transport.query(addr, &domain, RecordType::A).await {
                Ok(response) if response.is_refused_or_servfail() => {
                    info!(
                        "[DNS] {} answered {} for {}",
                        nameserver, response.response_code, domain
                    );
                    return Ok(true);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("[DNS] Nameserver {} unusable for {}: {}", nameserver, domain, e);
                }
            }
        }

        Ok(false)
    }

    async fn apex_nameservers(&self, apex: &str) -> Result<Arc<Vec<String>>, DnsError> {
        if let Some(cached) = self.cache.nameservers(apex).await {
            return Ok(cached);
        }

        let response = self
            .transport
            .query(self.resolver, apex, RecordType::NS)
            .await?;

        Ok(self
            .cache
            .store_nameservers(apex, response.nameservers())
            .await)
    }

    /// NS set for `domain` as delegated by the apex's first nameserver
    async fn delegated_nameservers(&self, domain: &str, apex_nameservers: &[String]) -> Vec<String> {
        let Some(first) = apex_nameservers.first() else {
            return Vec::new();
        };
        let Some(addr) = self.nameserver_addr(first).await else {
            return Vec::new();
        };

        match self.transport.query(addr, domain, RecordType::NS).await {
            Ok(response) => response.ns_records(),
            Err(e) => {
                warn!("[DNS] Delegation lookup for {} via {} failed: {}", domain, first, e);
                Vec::new()
            }
        }
    }

    async fn nameserver_addr(&self, host: &str) -> Option<SocketAddr> {
        if let Some(addr) = self.cache.address(host).await {
            return Some(addr);
        }

        let response = match self
            .transport
            .query(self.resolver, host, RecordType::A)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("[DNS] Could not resolve nameserver {}: {}", host, e);
                return None;
            }
        };

        let Some(ip) = response.ipv4().first().copied() else {
            warn!("[DNS] Nameserver {} has no IPv4 address", host);
            return None;
        };

        let addr = SocketAddr::new(ip.into(), DNS_PORT);
        self.cache.store_address(host, addr).await;
        Some(addr)
    }
}
