// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Evidence for an authority that answers SERVFAIL or REFUSED
pub const EVIDENCE_MISBEHAVING_AUTHORITY: &str = "REFUSED/SERVFAIL DNS status";

/// Evidence for a CNAME whose apex no longer resolves
pub const EVIDENCE_DEAD_RECORD: &str = "Dead DNS record";

/// Evidence for a matched provider whose host cannot be reached over HTTP
pub const EVIDENCE_UNREACHABLE: &str = "can't reach host but DNS indicates a live CNAME";

/// One hosting platform fingerprint, as loaded from the provider data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFingerprint {
    pub name: String,

    /// Regular expression tested against the resolved CNAME
    #[serde(rename = "cname")]
    pub cname_pattern: String,

    /// Regular expression tested against the probe response body
    #[serde(rename = "string")]
    pub content_pattern: String,

    /// Probe over plain HTTP instead of HTTPS
    #[serde(
        rename = "http",
        default,
        deserialize_with = "deserialize_flag",
        serialize_with = "serialize_flag"
    )]
    pub use_http: bool,
}

impl ProviderFingerprint {
    pub fn new(name: &str, cname_pattern: &str, content_pattern: &str, use_http: bool) -> Self {
        Self {
            name: name.to_string(),
            cname_pattern: cname_pattern.to_string(),
            content_pattern: content_pattern.to_string(),
            use_http,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_http {
            "http://"
        } else {
            "https://"
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false))
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(if *value { "true" } else { "false" })
}

/// Outcome of scanning one domain against one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScanResult {
    pub domain: String,
    pub resolved_cname: String,
    pub provider: String,
    pub is_vulnerable: bool,
    pub is_taken_over: bool,
    pub evidence: String,
}

impl DomainScanResult {
    /// Result for a domain that has not been flagged yet
    pub fn pending(domain: &str, cname: &str, provider: &str) -> Self {
        Self {
            domain: domain.to_string(),
            resolved_cname: cname.to_string(),
            provider: provider.to_string(),
            is_vulnerable: false,
            is_taken_over: false,
            evidence: String::new(),
        }
    }

    /// Vulnerable result produced from a DNS-level classification
    pub fn dns_finding(domain: &str, cname: &str, evidence: &str) -> Self {
        Self {
            is_vulnerable: true,
            evidence: evidence.to_string(),
            ..Self::pending(domain, cname, "")
        }
    }

    /// Diagnostic result for a CNAME that matches no registry entry
    pub fn undetermined(domain: &str, cname: &str) -> Self {
        Self {
            evidence: format!("CNAME [{}] found but could not determine provider", cname),
            ..Self::pending(domain, cname, "")
        }
    }

    /// Record the takeover outcome. A result that is not vulnerable is never taken over.
    pub fn mark_taken_over(&mut self, taken: bool) {
        self.is_taken_over = taken && self.is_vulnerable;
    }
}

/// Domain that produced no results because its scan failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainFailure {
    pub domain: String,
    pub error: String,
    /// The failure is a "no CNAME" classification rather than an operational error
    pub not_found: bool,
}

/// Everything a batch run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub results: Vec<DomainScanResult>,
    pub failures: Vec<DomainFailure>,
    pub domains_scanned: usize,
    pub started_at: String,
    pub completed_at: String,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ScanReport {
    pub fn vulnerable(&self) -> impl Iterator<Item = &DomainScanResult> {
        self.results.iter().filter(|r| r.is_vulnerable)
    }

    pub fn taken_over(&self) -> impl Iterator<Item = &DomainScanResult> {
        self.results.iter().filter(|r| r.is_taken_over)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
