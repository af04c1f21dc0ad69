// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Takeover Dispatcher
 * Routes a vulnerable (domain, provider) pair to the handler that can claim it
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod github;
pub mod heroku;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TakeoverConfig;
use crate::errors::TakeoverError;

pub use github::GitHubPagesTakeover;
pub use heroku::HerokuTakeover;

/// Timeout for a single provider API call
pub(crate) const API_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const API_USER_AGENT: &str = concat!("tko-scanner/", env!("CARGO_PKG_VERSION"));

/// Claims a dangling resource on one hosting provider
#[async_trait]
pub trait TakeoverHandler: Send + Sync {
    /// Provider name as it appears in the registry
    fn provider(&self) -> &str;

    /// `Ok(true)` once the resource is claimed for `domain`
    async fn attempt_takeover(&self, domain: &str) -> Result<bool, TakeoverError>;
}

/// Provider name -> handler. Providers without a handler are reported
/// vulnerable but never claimed.
#[derive(Default, Clone)]
pub struct TakeoverDispatcher {
    handlers: HashMap<String, Arc<dyn TakeoverHandler>>,
}

impl TakeoverDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for every provider whose credentials are configured
    pub fn from_config(config: &TakeoverConfig) -> Result<Self> {
        let mut dispatcher = Self::new();

        if config.has_github() {
            dispatcher.register(Arc::new(GitHubPagesTakeover::from_config(config)?));
        }

        if config.has_heroku() {
            dispatcher.register(Arc::new(HerokuTakeover::from_config(config)?));
        }

        debug!(
            "[Takeover] Registered handlers: {:?}",
            dispatcher.providers()
        );
        Ok(dispatcher)
    }

    pub fn register(&mut self, handler: Arc<dyn TakeoverHandler>) {
        self.handlers
            .insert(handler.provider().to_ascii_lowercase(), handler);
    }

    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn dispatch(&self, domain: &str, provider: &str) -> Result<bool, TakeoverError> {
        let Some(handler) = self.handlers.get(&provider.to_ascii_lowercase()) else {
            debug!("[Takeover] No handler for {}, {} left as is", provider, domain);
            return Ok(false);
        };

        info!("[Takeover] Attempting {} takeover of {}", provider, domain);
        let taken = handler.attempt_takeover(domain).await?;
        if taken {
            info!(
                "[Takeover] Claimed {} on {}; check it again in a few minutes",
                domain, provider
            );
        }
        Ok(taken)
    }
}

/// Map a non-success API response to a takeover error
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> TakeoverError {
    let status = response.status().as_u16();
    let exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    if status == 429 || (status == 403 && exhausted) {
        return TakeoverError::RateLimited {
            provider: provider.to_string(),
        };
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    TakeoverError::Api {
        provider: provider.to_string(),
        status,
        message,
    }
}
