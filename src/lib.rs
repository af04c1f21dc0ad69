// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Takeover Scanner Library
 * Scan engine, DNS client and provider collaborators
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod dns;
pub mod dns_cache;
pub mod errors;
pub mod evaluator;
pub mod http_client;
pub mod input;
pub mod registry;
pub mod reporting;
pub mod scanners;
pub mod takeover;
pub mod types;

pub use errors::{DnsError, HttpError, ScannerError, ScannerResult, TakeoverError};
pub use scanners::ScanEngine;
pub use types::{DomainScanResult, ProviderFingerprint, ScanReport};
