// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - DNS Wire Transport
 * Raw single-question exchanges against one server, response code preserved
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use hickory_resolver::proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use super::apex::normalize;
use crate::errors::DnsError;

/// Largest UDP payload we accept
const MAX_UDP_PAYLOAD: usize = 4096;

/// Record payloads the scanner cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    Cname(String),
    Ns(String),
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Soa { mname: String },
    Other(RecordType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(name: &str, data: RecordData) -> Self {
        Self {
            name: normalize(name),
            data,
        }
    }

    fn from_wire(record: &Record) -> Self {
        let data = match record.data() {
            RData::CNAME(cname) => RecordData::Cname(normalize(&cname.0.to_ascii())),
            RData::NS(ns) => RecordData::Ns(normalize(&ns.0.to_ascii())),
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::Aaaa(aaaa.0),
            RData::SOA(soa) => RecordData::Soa {
                mname: normalize(&soa.mname().to_ascii()),
            },
            _ => RecordData::Other(record.record_type()),
        };

        Self {
            name: normalize(&record.name().to_ascii()),
            data,
        }
    }
}

/// Decoded answer to one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    pub response_code: ResponseCode,
    pub answers: Vec<DnsRecord>,
    pub authorities: Vec<DnsRecord>,
}

impl DnsResponse {
    pub fn new(response_code: ResponseCode) -> Self {
        Self {
            response_code,
            answers: Vec::new(),
            authorities: Vec::new(),
        }
    }

    pub fn with_answer(mut self, name: &str, data: RecordData) -> Self {
        self.answers.push(DnsRecord::new(name, data));
        self
    }

    pub fn with_authority(mut self, name: &str, data: RecordData) -> Self {
        self.authorities.push(DnsRecord::new(name, data));
        self
    }

    pub fn from_message(message: &Message) -> Self {
        Self {
            response_code: message.response_code(),
            answers: message.answers().iter().map(DnsRecord::from_wire).collect(),
            authorities: message
                .name_servers()
                .iter()
                .map(DnsRecord::from_wire)
                .collect(),
        }
    }

    /// CNAME target for `owner`, or the first CNAME in the answer section
    pub fn cname_for(&self, owner: &str) -> Option<&str> {
        let owner = normalize(owner);
        let mut first = None;

        for record in &self.answers {
            if let RecordData::Cname(target) = &record.data {
                if record.name == owner {
                    return Some(target);
                }
                first.get_or_insert(target.as_str());
            }
        }

        first
    }

    /// NS hostnames from the answer section, else from the authority section
    pub fn ns_records(&self) -> Vec<String> {
        let from = |records: &[DnsRecord]| -> Vec<String> {
            records
                .iter()
                .filter_map(|r| match &r.data {
                    RecordData::Ns(host) => Some(host.clone()),
                    _ => None,
                })
                .collect()
        };

        let answers = from(&self.answers);
        if !answers.is_empty() {
            return answers;
        }
        from(&self.authorities)
    }

    /// NS hostnames, falling back to the SOA primary when no NS is present
    pub fn nameservers(&self) -> Vec<String> {
        let ns = self.ns_records();
        if !ns.is_empty() {
            return ns;
        }

        self.answers
            .iter()
            .chain(self.authorities.iter())
            .filter_map(|r| match &r.data {
                RecordData::Soa { mname } if !mname.is_empty() => Some(mname.clone()),
                _ => None,
            })
            .take(1)
            .collect()
    }

    pub fn ipv4(&self) -> Vec<Ipv4Addr> {
        self.answers
            .iter()
            .filter_map(|r| match r.data {
                RecordData::A(ip) => Some(ip),
                _ => None,
            })
            .collect()
    }

    pub fn is_nxdomain(&self) -> bool {
        self.response_code == ResponseCode::NXDomain
    }

    pub fn is_refused_or_servfail(&self) -> bool {
        matches!(
            self.response_code,
            ResponseCode::ServFail | ResponseCode::Refused
        )
    }
}

/// One question to one server
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn query(
        &self,
        server: SocketAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<DnsResponse, DnsError>;
}

/// UDP exchange with TCP fallback on truncation
pub struct UdpTransport {
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_query(server: SocketAddr, name: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), DnsError> {
        let fqdn = format!("{}.", normalize(name));
        let name = Name::from_ascii(&fqdn).map_err(|e| DnsError::Protocol {
            server,
            reason: format!("invalid name {}: {}", fqdn, e),
        })?;

        let id: u16 = rand::random();
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        message.add_query(Query::query(name, record_type));

        let bytes = message.to_vec().map_err(|e| DnsError::Protocol {
            server,
            reason: format!("failed to encode query: {}", e),
        })?;

        Ok((id, bytes))
    }

    async fn exchange_udp(&self, server: SocketAddr, id: u16, query: &[u8]) -> Result<Message, DnsError> {
        let protocol = |reason: String| DnsError::Protocol { server, reason };

        let bind_addr: SocketAddr = if server.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| protocol(format!("bind failed: {}", e)))?;
        socket
            .connect(server)
            .await
            .map_err(|e| protocol(format!("connect failed: {}", e)))?;
        socket
            .send(query)
            .await
            .map_err(|e| protocol(format!("send failed: {}", e)))?;

        let receive = async {
            let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
            loop {
                let len = socket
                    .recv(&mut buf)
                    .await
                    .map_err(|e| protocol(format!("receive failed: {}", e)))?;

                let message = Message::from_vec(&buf[..len])
                    .map_err(|e| protocol(format!("malformed response: {}", e)))?;

                // Stray datagrams for other ids are dropped
                if message.id() == id {
                    return Ok::<Message, DnsError>(message);
                }
                debug!("[DNS] Ignoring response with id {} from {}", message.id(), server);
            }
        };

        tokio::time::timeout(self.timeout, receive)
            .await
            .map_err(|_| DnsError::Timeout {
                server,
                timeout: self.timeout,
            })?
    }

    async fn exchange_tcp(&self, server: SocketAddr, id: u16, query: &[u8]) -> Result<Message, DnsError> {
        let protocol = |reason: String| DnsError::Protocol { server, reason };

        let exchange = async {
            let mut stream = TcpStream::connect(server)
                .await
                .map_err(|e| protocol(format!("tcp connect failed: {}", e)))?;

            let len = u16::try_from(query.len())
                .map_err(|_| protocol("query too large".to_string()))?;
            let mut framed = Vec::with_capacity(query.len() + 2);
            framed.extend_from_slice(&len.to_be_bytes());
            framed.extend_from_slice(query);

            stream
                .write_all(&framed)
                .await
                .map_err(|e| protocol(format!("tcp send failed: {}", e)))?;

            let response_len = stream
                .read_u16()
                .await
                .map_err(|e| protocol(format!("tcp receive failed: {}", e)))?;
            let mut buf = vec![0u8; response_len as usize];
            stream
                .read_exact(&mut buf)
                .await
                .map_err(|e| protocol(format!("tcp receive failed: {}", e)))?;

            let message = Message::from_vec(&buf)
                .map_err(|e| protocol(format!("malformed response: {}", e)))?;
            if message.id() != id {
                return Err(protocol(format!(
                    "response id {} does not match query id {}",
                    message.id(),
                    id
                )));
            }
            Ok::<Message, DnsError>(message)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| DnsError::Timeout {
                server,
                timeout: self.timeout,
            })?
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn query(
        &self,
        server: SocketAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<DnsResponse, DnsError> {
        let (id, query) = Self::build_query(server, name, record_type)?;

        let mut message = self.exchange_udp(server, id, &query).await?;
        if message.truncated() {
            debug!("[DNS] Truncated answer for {} {} from {}, retrying over TCP", name, record_type, server);
            message = self.exchange_tcp(server, id, &query).await?;
        }

        let response = DnsResponse::from_message(&message);
        debug!(
            "[DNS] {} {} @{} -> {} ({} answers, {} authority)",
            name,
            record_type,
            server,
            response.response_code,
            response.answers.len(),
            response.authorities.len()
        );

        Ok(response)
    }
}
