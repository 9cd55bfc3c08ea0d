//! One receive surface over IPv4 and IPv6 multicast sockets.
//!
//! The capture loop is written once against [`MulticastTransport`]; the two
//! implementations differ only in how they join groups and which packet-info
//! control message carries the destination address.

mod ipv4;
mod ipv6;

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use shared::error::Result;
use shared::ifaces::Interface;

use crate::config::{DEFAULT_READ_TIMEOUT, MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6};
use crate::socket::{MIN_READ_TIMEOUT, MulticastSocket};

pub use ipv4::Ipv4Transport;
pub use ipv6::Ipv6Transport;

/// The IP address family a worker captures on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// The mDNS multicast group for this family.
    pub fn group(&self) -> IpAddr {
        match self {
            AddressFamily::Ipv4 => IpAddr::V4(MDNS_MULTICAST_IPV4),
            AddressFamily::Ipv6 => IpAddr::V6(MDNS_MULTICAST_IPV6),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// Metadata for one received datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Bytes written into the receive buffer
    pub len: usize,
    /// Sending socket
    pub peer_addr: SocketAddr,
    /// Arrival interface, when the platform reports it
    pub if_index: Option<u32>,
    /// Destination address from the IP header, when the platform reports it
    pub dst_ip: Option<IpAddr>,
}

impl Received {
    /// Source address from the IP header.
    pub fn src_ip(&self) -> IpAddr {
        self.peer_addr.ip()
    }
}

/// A socket bound to the mDNS port for one address family.
///
/// Every call blocks; [`MulticastTransport::receive`] returns
/// [`Error::ErrTimeout`](shared::error::Error::ErrTimeout) once the deadline
/// set with [`MulticastTransport::set_read_deadline`] passes.
pub trait MulticastTransport: Send {
    fn join_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()>;

    fn leave_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()>;

    fn set_read_deadline(&mut self, deadline: Instant) -> Result<()>;

    fn receive(&mut self, buf: &mut [u8]) -> Result<Received>;
}

/// Creates the transport a worker listens on.
pub trait TransportBinder: Send + Sync + 'static {
    fn bind(&self, family: AddressFamily) -> Result<Box<dyn MulticastTransport>>;
}

/// Binds real sockets through [`MulticastSocket`].
#[derive(Debug, Clone)]
pub struct SocketBinder {
    read_timeout: Duration,
}

impl Default for SocketBinder {
    fn default() -> Self {
        Self::new(DEFAULT_READ_TIMEOUT)
    }
}

impl SocketBinder {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl TransportBinder for SocketBinder {
    fn bind(&self, family: AddressFamily) -> Result<Box<dyn MulticastTransport>> {
        let socket = MulticastSocket::new(family.group())
            .with_read_timeout(self.read_timeout)
            .into_socket()?;
        Ok(match family {
            AddressFamily::Ipv4 => Box::new(Ipv4Transport::new(socket)),
            AddressFamily::Ipv6 => Box::new(Ipv6Transport::new(socket)),
        })
    }
}

// read_timeout_until converts a deadline into a socket receive timeout.
pub(crate) fn read_timeout_until(deadline: Instant) -> Duration {
    deadline
        .saturating_duration_since(Instant::now())
        .max(MIN_READ_TIMEOUT)
}
