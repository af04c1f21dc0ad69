// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

#![allow(dead_code)]

use async_trait::async_trait;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tko_scanner::config::AppConfig;
use tko_scanner::dns::{DnsClient, DnsResponse, DnsTransport, RecordData};
use tko_scanner::errors::DnsError;
use tko_scanner::registry::ProviderRegistry;
use tko_scanner::scanners::ScanEngine;
use tko_scanner::types::ProviderFingerprint;

pub type QueryKey = (SocketAddr, String, RecordType);

pub const GITHUB_PAGE: &str = "There isn't a GitHub Pages site here";

pub fn resolver() -> SocketAddr {
    "8.8.8.8:53".parse().unwrap()
}

pub fn ns_addr(last: u8) -> SocketAddr {
    SocketAddr::new(Ipv4Addr::new(192, 0, 2, last).into(), 53)
}

/// In-memory DNS: scripted answers, a call log and an in-flight gauge.
/// Unscripted questions get an empty NOERROR answer.
#[derive(Default)]
pub struct ScriptedDns {
    answers: Mutex<HashMap<QueryKey, Result<DnsResponse, DnsError>>>,
    calls: Mutex<Vec<QueryKey>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedDns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn on(&self, server: SocketAddr, name: &str, rtype: RecordType, answer: Result<DnsResponse, DnsError>) {
        self.answers
            .lock()
            .insert((server, name.to_string(), rtype), answer);
    }

    pub fn cname(&self, owner: &str, target: &str) {
        self.on(
            resolver(),
            owner,
            RecordType::CNAME,
            Ok(DnsResponse::new(ResponseCode::NoError)
                .with_answer(owner, RecordData::Cname(target.to_string()))),
        );
    }

    pub fn nxdomain(&self, name: &str) {
        self.on(resolver(), name, RecordType::A, Ok(DnsResponse::new(ResponseCode::NXDomain)));
    }

    /// Apex NS set served by the resolver, with addresses 192.0.2.1..n
    pub fn apex_nameservers(&self, apex: &str, hosts: &[&str]) {
        let mut response = DnsResponse::new(ResponseCode::NoError);
        for (i, host) in hosts.iter().enumerate() {
            response = response.with_answer(apex, RecordData::Ns(host.to_string()));
            self.on(
                resolver(),
                host,
                RecordType::A,
                Ok(DnsResponse::new(ResponseCode::NoError)
                    .with_answer(host, RecordData::A(Ipv4Addr::new(192, 0, 2, i as u8 + 1)))),
            );
        }
        self.on(resolver(), apex, RecordType::NS, Ok(response));
    }

    pub fn authority_answers(&self, server: SocketAddr, domain: &str, code: ResponseCode) {
        self.on(server, domain, RecordType::A, Ok(DnsResponse::new(code)));
    }

    pub fn calls(&self) -> Vec<QueryKey> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, rtype: RecordType) -> usize {
        self.calls.lock().iter().filter(|(_, _, t)| *t == rtype).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for ScriptedDns {
    async fn query(&self, server: SocketAddr, name: &str, rtype: RecordType) -> Result<DnsResponse, DnsError> {
        let key = (server, name.to_string(), rtype);
        self.calls.lock().push(key.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let answer = self
            .answers
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(DnsResponse::new(ResponseCode::NoError)));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer
    }
}

pub fn github_registry() -> ProviderRegistry {
    // Plain HTTP so the probe can hit a local mock server
    ProviderRegistry::new(vec![ProviderFingerprint::new(
        "github",
        "github\\.io$",
        GITHUB_PAGE,
        true,
    )])
}

pub fn test_config(concurrency: usize, http_timeout_secs: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.scanner.concurrency = concurrency;
    config.scanner.http_timeout_secs = http_timeout_secs;
    config
}

pub fn engine(dns: &Arc<ScriptedDns>, registry: ProviderRegistry, config: &AppConfig) -> ScanEngine {
    ScanEngine::new(config, registry)
        .unwrap()
        .with_dns(DnsClient::new(dns.clone(), resolver()))
}
