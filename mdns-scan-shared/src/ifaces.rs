//! System network interface enumeration.
//!
//! Interfaces are read with `getifaddrs(3)`, which yields one entry per
//! (interface, address) pair; entries are folded into one [`Interface`] per
//! name, keeping the order in which the kernel reports them.

use std::fmt;
use std::net::{IpAddr, SocketAddrV4, SocketAddrV6};

use nix::ifaddrs::getifaddrs;
use nix::net::if_::{InterfaceFlags, if_nametoindex};
use nix::sys::socket::SockaddrStorage;

use crate::error::{Error, Result};

/// A network interface as seen by the capture engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    /// Interface name, e.g. `eth0` or `en0`
    pub name: String,
    /// Kernel interface index, used for multicast membership and packet info
    pub index: u32,
    /// IFF_UP
    pub up: bool,
    /// IFF_LOOPBACK
    pub loopback: bool,
    /// IFF_MULTICAST
    pub multicast: bool,
    /// Every IPv4 and IPv6 address assigned to the interface
    pub addrs: Vec<IpAddr>,
}

impl Interface {
    /// An interface is worth joining when it has at least one address and
    /// advertises multicast capability.
    pub fn is_capture_candidate(&self) -> bool {
        !self.addrs.is_empty() && self.multicast
    }

    pub fn has_ipv4(&self) -> bool {
        self.addrs.iter().any(IpAddr::is_ipv4)
    }

    pub fn has_ipv6(&self) -> bool {
        self.addrs.iter().any(IpAddr::is_ipv6)
    }

    /// Flag names joined with `|`.
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.up {
            flags.push("up");
        }
        if self.loopback {
            flags.push("loopback");
        }
        if self.multicast {
            flags.push("multicast");
        }
        flags.join("|")
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (index={} flags={})",
            self.name,
            self.index,
            self.flags()
        )
    }
}

/// Lists every network interface on the system.
pub fn ifaces() -> Result<Vec<Interface>> {
    let mut interfaces: Vec<Interface> = Vec::new();

    for ifaddr in getifaddrs()? {
        let pos = match interfaces
            .iter()
            .position(|i| i.name == ifaddr.interface_name)
        {
            Some(pos) => pos,
            None => {
                let index = if_nametoindex(ifaddr.interface_name.as_str()).unwrap_or(0);
                interfaces.push(Interface {
                    name: ifaddr.interface_name.clone(),
                    index,
                    up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
                    loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                    multicast: ifaddr.flags.contains(InterfaceFlags::IFF_MULTICAST),
                    addrs: vec![],
                });
                interfaces.len() - 1
            }
        };

        // link-layer entries carry no IP address
        if let Some(ip) = ifaddr.address.as_ref().and_then(sockaddr_ip) {
            let iface = &mut interfaces[pos];
            if !iface.addrs.contains(&ip) {
                iface.addrs.push(ip);
            }
        }
    }

    Ok(interfaces)
}

/// Looks an interface up by name.
pub fn interface_by_name(name: &str) -> Result<Interface> {
    ifaces()?
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| Error::ErrInterfaceNotFound(name.to_owned()))
}

fn sockaddr_ip(addr: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(sin) = addr.as_sockaddr_in() {
        Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
    } else {
        addr.as_sockaddr_in6()
            .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn iface(addrs: Vec<IpAddr>, multicast: bool) -> Interface {
        Interface {
            name: "eth0".to_owned(),
            index: 2,
            up: true,
            loopback: false,
            multicast,
            addrs,
        }
    }

    #[test]
    fn test_capture_candidate() {
        let v4 = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10));
        assert!(iface(vec![v4], true).is_capture_candidate());
        assert!(!iface(vec![v4], false).is_capture_candidate());
        assert!(!iface(vec![], true).is_capture_candidate());
    }

    #[test]
    fn test_address_families() {
        let v4 = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let v6 = IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1));

        let i = iface(vec![v4], true);
        assert!(i.has_ipv4());
        assert!(!i.has_ipv6());

        let i = iface(vec![v4, v6], true);
        assert!(i.has_ipv4());
        assert!(i.has_ipv6());
    }

    #[test]
    fn test_interface_display() {
        let i = iface(vec![], true);
        assert_eq!(i.to_string(), "eth0 (index=2 flags=up|multicast)");
    }

    #[test]
    fn test_interface_by_name_unknown() {
        let result = interface_by_name("no-such-interface-0");
        assert_eq!(
            result.unwrap_err(),
            Error::ErrInterfaceNotFound("no-such-interface-0".to_owned())
        );
    }
}
