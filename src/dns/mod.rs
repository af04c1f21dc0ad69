// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod apex;
pub mod client;
pub mod transport;

pub use apex::{apex_of, normalize};
pub use client::DnsClient;
pub use transport::{DnsRecord, DnsResponse, DnsTransport, RecordData, UdpTransport};
