// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::core::AppConfig;
use super::validation::ConfigValidator;

pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    /// Loader that reads `config_path` (if any) and then the environment
    pub fn new<P: AsRef<Path>>(config_path: Option<P>) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
        }
    }

    pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<AppConfig> {
        let config = match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML config")?
            }
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config")?,
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON config")?
            }
        };
        Ok(config)
    }

    /// File (or defaults), then environment overrides, then validation
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config_path {
            Some(path) => {
                let format = Self::detect_format(path)?;
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                debug!("Loading configuration from {:?}", path);
                Self::parse(&content, format)?
            }
            None => AppConfig::default(),
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;

        ConfigValidator::validate_app_config(&config)?;

        Ok(config)
    }
}

/// Apply `TKO_*`, `GITHUB_*` and `HEROKU_*` overrides from `lookup`
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(resolver) = lookup("TKO_RESOLVER") {
        config.scanner.resolver = resolver.parse().context("Invalid TKO_RESOLVER")?;
    }

    if let Some(concurrency) = lookup("TKO_CONCURRENCY") {
        config.scanner.concurrency = concurrency.parse().context("Invalid TKO_CONCURRENCY")?;
    }

    if let Some(timeout) = lookup("TKO_DNS_TIMEOUT") {
        config.scanner.dns_timeout_secs = timeout.parse().context("Invalid TKO_DNS_TIMEOUT")?;
    }

    if let Some(timeout) = lookup("TKO_HTTP_TIMEOUT") {
        config.scanner.http_timeout_secs = timeout.parse().context("Invalid TKO_HTTP_TIMEOUT")?;
    }

    if let Some(token) = lookup("GITHUB_TOKEN") {
        config.takeover.github_token = Some(token);
    }

    if let Some(username) = lookup("HEROKU_USERNAME") {
        config.takeover.heroku_username = Some(username);
    }

    if let Some(key) = lookup("HEROKU_API_KEY") {
        config.takeover.heroku_api_key = Some(key);
    }

    if let Some(app) = lookup("HEROKU_APP_NAME") {
        config.takeover.heroku_app_name = Some(app);
    }

    Ok(())
}
