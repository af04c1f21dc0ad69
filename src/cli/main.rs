// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * TKO Scanner - Subdomain Takeover Scanner
 * Standalone CLI for dangling CNAME detection
 *
 * Features:
 * - CNAME chain and dead apex detection
 * - Authoritative REFUSED/SERVFAIL probing
 * - Provider fingerprints from a CSV registry
 * - Optional GitHub Pages / Heroku takeover
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use tko_scanner::config::{AppConfig, ConfigLoader, ConfigValidator};
use tko_scanner::input::DomainSource;
use tko_scanner::registry::ProviderRegistry;
use tko_scanner::reporting;
use tko_scanner::scanners::ScanEngine;

/// TKO Scanner - find (and optionally claim) dangling subdomains
#[derive(Parser, Debug)]
#[command(name = "tko-scanner")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Subdomain takeover scanner: dangling CNAMEs, dead records, broken authorities", long_about = None)]
struct Cli {
    /// File with one domain per line
    #[arg(long, default_value = "domains.txt")]
    domains: PathBuf,

    /// Comma separated domains to scan instead of the domains file
    #[arg(long)]
    domain: Option<String>,

    /// Provider fingerprint CSV (name,cname,string,http)
    #[arg(long, default_value = "providers-data.csv")]
    data: PathBuf,

    /// Output file; `.json` writes JSON, anything else CSV. Empty disables.
    #[arg(long, default_value = "output.csv")]
    output: String,

    /// Try to claim vulnerable domains on supported providers
    #[arg(long)]
    takeover: bool,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    githubtoken: Option<String>,

    /// Heroku account username
    #[arg(long, env = "HEROKU_USERNAME")]
    herokuusername: Option<String>,

    /// Heroku API key
    #[arg(long, env = "HEROKU_API_KEY", hide_env_values = true)]
    herokuapikey: Option<String>,

    /// Heroku app that receives taken-over domains
    #[arg(long, env = "HEROKU_APP_NAME")]
    herokuappname: Option<String>,

    /// Number of domains scanned concurrently
    #[arg(long)]
    threads: Option<usize>,

    /// DNS resolver (ip:port)
    #[arg(long)]
    resolver: Option<SocketAddr>,

    /// Configuration file path (toml, yaml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Report destination, `None` when export is disabled
    fn output_path(&self) -> Option<PathBuf> {
        let output = self.output.trim();
        if output.is_empty() {
            None
        } else {
            Some(PathBuf::from(output))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    // Create async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("tko-scanner")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Config file and environment first, then flags on top
fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = ConfigLoader::new(cli.config.as_ref()).load_config()?;

    if let Some(threads) = cli.threads {
        config.scanner.concurrency = threads;
    }
    if let Some(resolver) = cli.resolver {
        config.scanner.resolver = resolver;
    }

    let takeover = &mut config.takeover;
    takeover.enabled |= cli.takeover;
    if cli.githubtoken.is_some() {
        takeover.github_token = cli.githubtoken.clone();
    }
    if cli.herokuusername.is_some() {
        takeover.heroku_username = cli.herokuusername.clone();
    }
    if cli.herokuapikey.is_some() {
        takeover.heroku_api_key = cli.herokuapikey.clone();
    }
    if cli.herokuappname.is_some() {
        takeover.heroku_app_name = cli.herokuappname.clone();
    }

    ConfigValidator::validate_app_config(&config)?;
    Ok(config)
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;

    let registry = ProviderRegistry::from_csv_path(&cli.data)
        .with_context(|| format!("Failed to load provider data from {}", cli.data.display()))?;
    info!("Loaded {} provider fingerprints", registry.len());

    let source = match &cli.domain {
        Some(list) => DomainSource::Inline(list.clone()),
        None => DomainSource::File(cli.domains.clone()),
    };
    let domains = source.load().context("Failed to load domains")?;

    if domains.is_empty() {
        error!("No domains to scan");
        return Ok(());
    }

    let engine = ScanEngine::new(&config, registry)?;
    let report = engine.scan_all(domains).await?;

    reporting::print_report(&report);

    if let Some(path) = cli.output_path() {
        reporting::write_report(&report, &path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_is_csv_file() {
        let cli = Cli::try_parse_from(["tko-scanner"]).unwrap();
        assert_eq!(cli.output_path(), Some(PathBuf::from("output.csv")));
    }

    #[test]
    fn test_empty_output_disables_export() {
        let cli = Cli::try_parse_from(["tko-scanner", "--domains", "d.txt", "--output", ""]).unwrap();
        assert_eq!(cli.output_path(), None);
        assert_eq!(cli.domains, PathBuf::from("d.txt"));
    }

    #[test]
    fn test_json_output_path() {
        let cli = Cli::try_parse_from(["tko-scanner", "--output", "report.json"]).unwrap();
        assert_eq!(cli.output_path(), Some(PathBuf::from("report.json")));
    }
}
