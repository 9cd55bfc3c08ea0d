//! Socket utilities for capture.
//!
//! This module provides [`MulticastSocket`], a builder for creating UDP
//! sockets that can receive mDNS traffic for one address family.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdns_scan::{MDNS_MULTICAST_IPV4, MulticastSocket};
//! use std::time::Duration;
//!
//! let socket = MulticastSocket::new(MDNS_MULTICAST_IPV4.into())
//!     .with_read_timeout(Duration::from_secs(1))
//!     .into_socket()?;
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use nix::sys::socket::{setsockopt, sockopt};
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::{DEFAULT_READ_TIMEOUT, MDNS_MULTICAST_IPV4, MDNS_PORT};

// SO_RCVTIMEO of zero blocks forever
pub(crate) const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// A builder for creating multicast UDP sockets suitable for passive mDNS
/// capture.
///
/// The resulting socket will be:
///
/// - Bound to the mDNS port for the family of `group`
/// - Configured with `SO_REUSEADDR` enabled, so other responders on the host
///   keep working
/// - Configured with `SO_REUSEPORT` enabled (on supported platforms)
/// - Blocking, with a receive timeout so the reader can poll for shutdown
/// - Asking the kernel for the destination address and arrival interface of
///   each datagram (`IP_PKTINFO` / `IPV6_RECVPKTINFO`)
///
/// Group membership is left to the caller, one interface at a time.
#[derive(Debug, Clone)]
pub struct MulticastSocket {
    group: IpAddr,
    multicast_local_ip: Option<IpAddr>,
    multicast_local_port: Option<u16>,
    read_timeout: Duration,
}

impl MulticastSocket {
    /// Creates a new builder for the family of `group`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_scan::{MDNS_MULTICAST_IPV6, MulticastSocket};
    ///
    /// let builder = MulticastSocket::new(MDNS_MULTICAST_IPV6.into());
    /// ```
    pub fn new(group: IpAddr) -> Self {
        Self {
            group,
            multicast_local_ip: None,
            multicast_local_port: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_multicast_local_ip(mut self, multicast_local_ip: IpAddr) -> Self {
        self.multicast_local_ip = Some(multicast_local_ip);
        self
    }

    pub fn with_multicast_local_port(mut self, multicast_local_port: u16) -> Self {
        self.multicast_local_port = Some(multicast_local_port);
        self
    }

    /// Sets how long a receive may block before reporting a timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    fn local_addr(&self) -> SocketAddr {
        let ip = match (self.multicast_local_ip, self.group) {
            (Some(ip), _) => ip,
            (None, IpAddr::V4(_)) if cfg!(target_os = "linux") => IpAddr::V4(MDNS_MULTICAST_IPV4),
            // binding the group address doesn't work on Mac/BSD, only the
            // wildcard does
            (None, IpAddr::V4(_)) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            (None, IpAddr::V6(_)) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        SocketAddr::new(ip, self.multicast_local_port.unwrap_or(MDNS_PORT))
    }

    /// Converts this builder into a configured, bound `socket2::Socket`.
    ///
    /// # Errors
    ///
    /// Returns an error if socket creation, any socket option, or the bind
    /// fails.
    pub fn into_socket(self) -> io::Result<Socket> {
        let domain = match self.group {
            IpAddr::V4(_) => Domain::IPV4,
            IpAddr::V6(_) => Domain::IPV6,
        };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

        if self.group.is_ipv6() {
            socket.set_only_v6(true)?;
        }

        // Enable address reuse for multiple processes
        socket.set_reuse_address(true)?;

        // Enable port reuse on supported platforms
        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        socket.set_reuse_port(true)?;

        socket.set_nonblocking(false)?;
        socket.set_read_timeout(Some(self.read_timeout.max(MIN_READ_TIMEOUT)))?;

        enable_packet_info(&socket, self.group)?;

        let local_addr = self.local_addr();
        socket.bind(&local_addr.into())?;
        log::debug!("bound capture socket to {local_addr}");

        Ok(socket)
    }
}

fn enable_packet_info(socket: &Socket, group: IpAddr) -> io::Result<()> {
    let fd = socket.as_raw_fd();
    match group {
        IpAddr::V4(_) => {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            setsockopt(fd, sockopt::Ipv4PacketInfo, &true)?;
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            setsockopt(fd, sockopt::Ipv4RecvDstAddr, &true)?;
        }
        IpAddr::V6(_) => setsockopt(fd, sockopt::Ipv6RecvPacketInfo, &true)?,
    }
    Ok(())
}
