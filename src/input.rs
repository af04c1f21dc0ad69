// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::path::Path;
use tracing::debug;

use crate::dns::normalize;
use crate::errors::{ScannerError, ScannerResult};

/// Where the domains to scan come from
#[derive(Debug, Clone)]
pub enum DomainSource {
    /// One domain per line; blank lines and `#` comments are skipped
    File(std::path::PathBuf),
    /// Comma separated list given inline
    Inline(String),
}

impl DomainSource {
    pub fn load(&self) -> ScannerResult<Vec<String>> {
        let domains = match self {
            DomainSource::File(path) => read_domain_file(path)?,
            DomainSource::Inline(list) => parse_inline(list),
        };

        debug!("Loaded {} domains", domains.len());
        Ok(domains)
    }
}

pub fn read_domain_file(path: &Path) -> ScannerResult<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ScannerError::Input(format!("cannot read {}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .map(normalize)
        .filter(|domain| !domain.is_empty())
        .collect())
}

pub fn parse_inline(list: &str) -> Vec<String> {
    list.split(',')
        .map(normalize)
        .filter(|domain| !domain.is_empty())
        .collect()
}
