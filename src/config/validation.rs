// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use tracing::warn;
use validator::Validate;

use super::core::AppConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_app_config(config: &AppConfig) -> Result<()> {
        config
            .validate()
            .context("Configuration validation failed")?;

        Self::validate_takeover_config(config)?;

        Ok(())
    }

    fn validate_takeover_config(config: &AppConfig) -> Result<()> {
        let takeover = &config.takeover;

        for (name, url) in [
            ("github_api_url", &takeover.github_api_url),
            ("heroku_api_url", &takeover.heroku_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        if !takeover.enabled {
            return Ok(());
        }

        if takeover.heroku_app_name.is_some() && takeover.heroku_api_key.is_none() {
            return Err(anyhow::anyhow!(
                "Heroku app name is set but no Heroku API key was provided"
            ));
        }

        if !takeover.has_github() && !takeover.has_heroku() {
            warn!("Takeover enabled without provider credentials, vulnerable domains will only be reported");
        }

        Ok(())
    }
}
