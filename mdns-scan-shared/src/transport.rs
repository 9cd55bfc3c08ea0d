use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

/// Provenance of a received multicast datagram: the interface it arrived on,
/// the peer socket that sent it and the IP header addresses reported by the
/// kernel's packet-info control message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportContext {
    /// Name of the interface the datagram arrived on
    pub interface: String,
    /// Peer socket address, either IPv4 or IPv6
    pub peer_addr: SocketAddr,
    /// Source IP address of the datagram
    pub src_ip: IpAddr,
    /// Destination IP address of the datagram, normally the multicast group
    pub dst_ip: IpAddr,
}

impl Default for TransportContext {
    fn default() -> Self {
        Self {
            interface: String::new(),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            src_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            dst_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

impl fmt::Display for TransportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (from peer {}, intf={})",
            self.src_ip, self.dst_ip, self.peer_addr, self.interface
        )
    }
}

/// A generic received message with [TransportContext]
#[derive(Debug, Clone)]
pub struct TransportMessage<T> {
    /// Received time
    pub now: Instant,
    /// Where the message came from and which interface delivered it
    pub transport: TransportContext,
    /// Message body with generic type
    pub message: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_transport_context_display() {
        let ctx = TransportContext {
            interface: "eth0".to_owned(),
            peer_addr: "192.168.1.20:5353".parse().unwrap(),
            src_ip: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            dst_ip: IpAddr::V4(Ipv4Addr::new(224, 0, 0, 251)),
        };
        assert_eq!(
            ctx.to_string(),
            "192.168.1.20 -> 224.0.0.251 (from peer 192.168.1.20:5353, intf=eth0)"
        );
    }

    #[test]
    fn test_transport_context_display_v6() {
        let ctx = TransportContext {
            interface: "en0".to_owned(),
            peer_addr: "[fe80::1]:5353".parse().unwrap(),
            src_ip: IpAddr::V6("fe80::1".parse::<Ipv6Addr>().unwrap()),
            dst_ip: IpAddr::V6("ff02::fb".parse::<Ipv6Addr>().unwrap()),
        };
        assert_eq!(
            ctx.to_string(),
            "fe80::1 -> ff02::fb (from peer [fe80::1]:5353, intf=en0)"
        );
    }
}
