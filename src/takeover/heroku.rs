// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{api_error, TakeoverHandler, API_TIMEOUT, API_USER_AGENT};
use crate::config::TakeoverConfig;
use crate::errors::TakeoverError;

const PROVIDER: &str = "heroku";
const API_MEDIA_TYPE: &str = "application/vnd.heroku+json; version=3";

/// Adds the dangling domain as a custom domain of an app the operator owns
pub struct HerokuTakeover {
    client: Client,
    api_url: String,
    username: String,
    api_key: String,
    app_name: String,
}

impl HerokuTakeover {
    pub fn new(api_url: &str, username: &str, api_key: &str, app_name: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(API_USER_AGENT)
            .build()
            .context("Failed to create Heroku API client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            api_key: api_key.to_string(),
            app_name: app_name.to_string(),
        })
    }

    pub fn from_config(config: &TakeoverConfig) -> Result<Self> {
        Self::new(
            &config.heroku_api_url,
            config.heroku_username.as_deref().unwrap_or_default(),
            config.heroku_api_key.as_deref().unwrap_or_default(),
            config.heroku_app_name.as_deref().unwrap_or_default(),
        )
    }
}

#[async_trait]
impl TakeoverHandler for HerokuTakeover {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn attempt_takeover(&self, domain: &str) -> Result<bool, TakeoverError> {
        if self.api_key.is_empty() || self.app_name.is_empty() {
            return Err(TakeoverError::MissingCredentials {
                provider: PROVIDER.to_string(),
                what: "an API key and an app name".to_string(),
            });
        }

        let url = format!("{}/apps/{}/domains", self.api_url, self.app_name);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.api_key))
            .header("Accept", API_MEDIA_TYPE)
            .json(&json!({ "hostname": domain }))
            .send()
            .await
            .map_err(|e| TakeoverError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        Ok(true)
    }
}
