//! # mdns-scan
//!
//! Passive capture and decoding of multicast DNS (mDNS) traffic.
//!
//! This crate joins the mDNS multicast groups (224.0.0.251 and ff02::fb, port
//! 5353) on every selected network interface, for both IPv4 and IPv6, and
//! hands each decoded message to the caller together with where it came from.
//! It never sends anything: it is an observer, not a resolver or responder.
//!
//! ## What is mDNS?
//!
//! Multicast DNS (mDNS) is a protocol that allows devices on a local network to discover
//! each other without a central DNS server. It's commonly used for:
//!
//! - Service discovery (finding printers, media servers, etc.)
//! - Resolving `.local` hostnames
//! - Zero-configuration networking (Bonjour, Avahi)
//!
//! ## Design
//!
//! - **Decoder**: [`Message::decode`] parses a DNS message from an untrusted
//!   buffer. Compression pointers are followed iteratively with a hop limit,
//!   every fixed size read is bounds checked, and a malformed buffer is an
//!   error, never a panic.
//! - **Transport**: [`MulticastTransport`] hides the IPv4 and IPv6 socket
//!   differences (group membership, packet-info control messages).
//! - **Capture**: [`Scanner`] runs one blocking worker per address family,
//!   merges their output into one stream and shuts them down in order.
//!
//! ## Quick Start
//!
//! ### Decode a datagram
//!
//! ```rust
//! use mdns_scan::{DnsType, Message};
//!
//! // a query for _http._tcp.local PTR
//! let mut packet = vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
//! packet.extend_from_slice(b"\x05_http\x04_tcp\x05local\x00");
//! packet.extend_from_slice(&[0, 12, 0, 1]);
//!
//! let msg = Message::decode(&packet).unwrap();
//! assert_eq!(msg.questions[0].name, "_http._tcp.local");
//! assert_eq!(msg.questions[0].typ, DnsType::PTR);
//! ```
//!
//! ### Capture until interrupted
//!
//! ```rust,ignore
//! use mdns_scan::{ScanConfig, Scanner};
//! use tokio::sync::broadcast;
//!
//! let (stop_tx, stop_rx) = broadcast::channel::<()>(1);
//! let scanner = Scanner::new(ScanConfig::default())?;
//! let summary = scanner
//!     .run(stop_rx, |event| {
//!         println!("{}", event.transport);
//!         println!("{}", event.message);
//!     })
//!     .await?;
//! ```
//!
//! ## Protocol Details
//!
//! - **Multicast Addresses**: 224.0.0.251:5353 (IPv4), \[ff02::fb\]:5353 (IPv6)
//! - **Record Types**: A, AAAA, PTR, TXT and SRV payloads are decoded; any
//!   other type keeps its raw rdata
//! - **Class**: the mDNS cache-flush / unicast-response bit is kept and shown
//!   as `IN|0x8000`

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub(crate) mod capture;
pub(crate) mod config;
pub(crate) mod message;
pub(crate) mod socket;
pub(crate) mod transport;

pub use capture::{DatagramEvent, ScanSummary, Scanner, StopReason, WorkerStats};
pub use config::{
    InterfaceSelection, MDNS_DEST_ADDR, MDNS_DEST_ADDR_V6, MDNS_MULTICAST_IPV4,
    MDNS_MULTICAST_IPV6, MDNS_PORT, ScanConfig,
};
pub use message::header::Header;
pub use message::question::Question;
pub use message::resource::{
    AResource, AaaaResource, PtrResource, Resource, ResourceBody, ResourceHeader, SrvResource,
    TxtResource,
};
pub use message::{
    DNSCLASS_CHAOS, DNSCLASS_HESIOD, DNSCLASS_INET, DnsClass, DnsType, Message, OpCode, RCode,
};
pub use transport::{
    AddressFamily, Ipv4Transport, Ipv6Transport, MulticastTransport, Received, SocketBinder,
    TransportBinder,
};

// Re-export socket utilities for convenience
pub use shared::error::{Error, Result};
pub use shared::ifaces;
pub use shared::{TransportContext, TransportMessage};
pub use socket::MulticastSocket;
