// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Authority Cache
 * Apex nameserver sets and nameserver addresses, shared by every domain of a run
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use moka::future::Cache;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default TTL for cached authority data (5 minutes)
const DEFAULT_TTL: u64 = 300;

/// Default maximum entries per cache
const DEFAULT_MAX_CAPACITY: u64 = 10000;

pub struct AuthorityCache {
    nameservers: Cache<String, Arc<Vec<String>>>,
    addresses: Cache<String, SocketAddr>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AuthorityCache {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let nameservers = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        let addresses = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        debug!(
            "Authority cache initialized: max_capacity={}, ttl={}s",
            max_capacity, ttl_secs
        );

        Self {
            nameservers,
            addresses,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached nameserver hostnames for an apex
    pub async fn nameservers(&self, apex: &str) -> Option<Arc<Vec<String>>> {
        let cached = self.nameservers.get(apex).await;
        self.record(cached.is_some());
        cached
    }

    pub async fn store_nameservers(&self, apex: &str, nameservers: Vec<String>) -> Arc<Vec<String>> {
        let nameservers = Arc::new(nameservers);
        self.nameservers
            .insert(apex.to_string(), Arc::clone(&nameservers))
            .await;
        nameservers
    }

    /// Cached socket address for a nameserver hostname
    pub async fn address(&self, host: &str) -> Option<SocketAddr> {
        let cached = self.addresses.get(host).await;
        self.record(cached.is_some());
        cached
    }

    pub async fn store_address(&self, host: &str, addr: SocketAddr) {
        self.addresses.insert(host.to_string(), addr).await;
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> AuthorityCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        AuthorityCacheStats {
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Authority cache statistics
#[derive(Debug, Clone)]
pub struct AuthorityCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl Default for AuthorityCache {
    fn default() -> Self {
        Self::new()
    }
}
