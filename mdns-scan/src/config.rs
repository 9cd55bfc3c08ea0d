//! Configuration for a capture run.
//!
//! This module provides the [`ScanConfig`] struct and the [`InterfaceSelection`]
//! it carries.
//!
//! # Examples
//!
//! ## Every interface, until interrupted
//!
//! ```rust
//! use mdns_scan::ScanConfig;
//!
//! let config = ScanConfig::default();
//! assert!(config.timeout.is_none());
//! ```
//!
//! ## Named interfaces with a run duration
//!
//! ```rust
//! use mdns_scan::{InterfaceSelection, ScanConfig};
//! use std::time::Duration;
//!
//! let config = ScanConfig::default()
//!     .with_interfaces("eth0,wlan0".parse::<InterfaceSelection>().unwrap())
//!     .with_timeout(Duration::from_secs(30));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use shared::error::{Error, Result};
use shared::ifaces::{Interface, ifaces};

/// The mDNS IPv4 multicast group address (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The mDNS IPv6 link-local multicast group address (ff02::fb).
pub const MDNS_MULTICAST_IPV6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 multicast destination address (224.0.0.251:5353).
///
/// # Example
///
/// ```rust
/// use mdns_scan::MDNS_DEST_ADDR;
///
/// assert_eq!(MDNS_DEST_ADDR.to_string(), "224.0.0.251:5353");
/// ```
pub const MDNS_DEST_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// mDNS IPv6 multicast destination address ([ff02::fb]:5353).
pub const MDNS_DEST_ADDR_V6: SocketAddr =
    SocketAddr::new(IpAddr::V6(MDNS_MULTICAST_IPV6), MDNS_PORT);

/// Default receive deadline, which is also how long a worker may take to
/// notice a stop request (1 second)
pub(crate) const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Default receive buffer size, the largest mDNS message RFC 6762 section 17
/// allows (9000 bytes)
pub(crate) const DEFAULT_RECV_BUFFER_SIZE: usize = 9000;

/// Default capacity of the channel workers emit decoded messages on
pub(crate) const DEFAULT_EVENT_QUEUE_SIZE: usize = 32;

/// Which interfaces to capture on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InterfaceSelection {
    /// Every system interface with an address and multicast capability.
    #[default]
    All,
    /// Only the named interfaces, still subject to the same capability check.
    Named(Vec<String>),
}

impl FromStr for InterfaceSelection {
    type Err = Infallible;

    /// Parses `""` or `"all"` as [`InterfaceSelection::All`], anything else as
    /// a comma separated list of names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(InterfaceSelection::All);
        }
        let names = s
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if names.is_empty() {
            Ok(InterfaceSelection::All)
        } else {
            Ok(InterfaceSelection::Named(names))
        }
    }
}

impl fmt::Display for InterfaceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceSelection::All => write!(f, "all"),
            InterfaceSelection::Named(names) => write!(f, "{}", names.join(",")),
        }
    }
}

impl InterfaceSelection {
    /// Builds the candidate set from the current system interfaces.
    ///
    /// An explicitly named interface that does not exist is an error. Named or
    /// not, only interfaces passing [`Interface::is_capture_candidate`] are
    /// returned, so the result may be empty.
    pub fn resolve(&self) -> Result<Vec<Interface>> {
        self.select(ifaces()?)
    }

    pub(crate) fn select(&self, system: Vec<Interface>) -> Result<Vec<Interface>> {
        let chosen = match self {
            InterfaceSelection::All => system,
            InterfaceSelection::Named(names) => {
                let mut chosen = Vec::with_capacity(names.len());
                for name in names {
                    let iface = system
                        .iter()
                        .find(|i| &i.name == name)
                        .ok_or_else(|| Error::ErrInterfaceNotFound(name.clone()))?;
                    if !chosen.contains(iface) {
                        chosen.push(iface.clone());
                    }
                }
                chosen
            }
        };

        Ok(chosen
            .into_iter()
            .filter(|iface| {
                let ok = iface.is_capture_candidate();
                if !ok {
                    log::debug!("skipping interface {iface}");
                }
                ok
            })
            .collect())
    }
}

/// Configuration for a capture run.
///
/// Use the builder pattern to construct a configuration:
///
/// ```rust
/// use mdns_scan::{InterfaceSelection, ScanConfig};
/// use std::time::Duration;
///
/// let config = ScanConfig::new()
///     .with_interfaces(InterfaceSelection::Named(vec!["en0".to_string()]))
///     .with_read_timeout(Duration::from_millis(500));
/// ```
///
/// # Fields
///
/// - `interfaces`: which interfaces to join the groups on (default: all)
/// - `timeout`: how long to run (default: None - until interrupted)
/// - `read_timeout`: receive deadline and stop polling period (default: 1 second)
/// - `recv_buffer_size`: largest datagram kept whole (default: 9000 bytes)
/// - `event_queue_size`: decoded messages buffered between workers and consumer (default: 32)
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Interfaces to capture on.
    ///
    /// Default: [`InterfaceSelection::All`]
    pub interfaces: InterfaceSelection,

    /// How long to capture before stopping on its own.
    ///
    /// When `None` the run only ends on an external stop request, or when
    /// every worker has exited.
    ///
    /// Default: None
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_scan::ScanConfig;
    /// use std::time::Duration;
    ///
    /// let config = ScanConfig::default()
    ///     .with_timeout(Duration::from_secs(10));
    /// assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    /// ```
    pub timeout: Option<Duration>,

    /// Deadline applied to every receive call.
    ///
    /// A worker blocked in a receive only checks for a stop request when the
    /// deadline expires, so this bounds how long shutdown may take.
    ///
    /// Default: 1 second
    pub read_timeout: Duration,

    /// Size of the buffer each worker receives into. Longer datagrams are
    /// truncated and will usually fail to decode.
    ///
    /// Default: 9000 bytes
    pub recv_buffer_size: usize,

    /// Capacity of the channel between workers and the consumer.
    ///
    /// Default: 32
    pub event_queue_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interfaces: InterfaceSelection::All,
            timeout: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
        }
    }
}

impl ScanConfig {
    /// Create a new configuration with default values.
    ///
    /// Equivalent to [`ScanConfig::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set which interfaces to capture on.
    pub fn with_interfaces(mut self, interfaces: InterfaceSelection) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Set the run duration. A zero duration means no timeout.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_scan::ScanConfig;
    /// use std::time::Duration;
    ///
    /// let config = ScanConfig::default().with_timeout(Duration::ZERO);
    /// assert!(config.timeout.is_none());
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            None
        } else {
            Some(timeout)
        };
        self
    }

    /// Set the receive deadline. A value of zero will use the default
    /// (1 second).
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = if read_timeout.is_zero() {
            DEFAULT_READ_TIMEOUT
        } else {
            read_timeout
        };
        self
    }

    /// Set the receive buffer size. A value of zero will use the default.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = if size == 0 {
            DEFAULT_RECV_BUFFER_SIZE
        } else {
            size
        };
        self
    }

    /// Set the event channel capacity. A value of zero will use the default.
    pub fn with_event_queue_size(mut self, size: usize) -> Self {
        self.event_queue_size = if size == 0 {
            DEFAULT_EVENT_QUEUE_SIZE
        } else {
            size
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, index: u32, multicast: bool, addrs: Vec<IpAddr>) -> Interface {
        Interface {
            name: name.to_owned(),
            index,
            up: true,
            loopback: false,
            multicast,
            addrs,
        }
    }

    fn system() -> Vec<Interface> {
        vec![
            iface("lo", 1, false, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
            iface("eth0", 2, true, vec![IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2))]),
            iface("docker0", 3, true, vec![]),
            iface(
                "wlan0",
                4,
                true,
                vec![IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 7))],
            ),
        ]
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("".parse::<InterfaceSelection>(), Ok(InterfaceSelection::All));
        assert_eq!("all".parse::<InterfaceSelection>(), Ok(InterfaceSelection::All));
        assert_eq!(" , ".parse::<InterfaceSelection>(), Ok(InterfaceSelection::All));
        assert_eq!(
            "eth0, wlan0,".parse::<InterfaceSelection>(),
            Ok(InterfaceSelection::Named(vec![
                "eth0".to_owned(),
                "wlan0".to_owned()
            ]))
        );
    }

    #[test]
    fn test_select_all_filters_candidates() {
        let chosen = InterfaceSelection::All.select(system()).unwrap();
        let names: Vec<_> = chosen.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["eth0", "wlan0"]);
    }

    #[test]
    fn test_select_named() {
        let sel = InterfaceSelection::Named(vec!["wlan0".into(), "lo".into(), "wlan0".into()]);
        let chosen = sel.select(system()).unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].index, 4);
    }

    #[test]
    fn test_select_unknown_name() {
        let sel = InterfaceSelection::Named(vec!["eth0".into(), "eth9".into()]);
        assert_eq!(
            sel.select(system()),
            Err(Error::ErrInterfaceNotFound("eth9".to_owned()))
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = ScanConfig::new();
        assert_eq!(config.interfaces, InterfaceSelection::All);
        assert_eq!(config.timeout, None);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.recv_buffer_size, 9000);
        assert_eq!(config.event_queue_size, 32);

        let config = config
            .with_timeout(Duration::from_secs(5))
            .with_read_timeout(Duration::ZERO)
            .with_event_queue_size(1);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
        assert_eq!(config.event_queue_size, 1);
    }

    #[test]
    fn test_dest_addrs() {
        assert_eq!(MDNS_DEST_ADDR.to_string(), "224.0.0.251:5353");
        assert_eq!(MDNS_DEST_ADDR_V6.to_string(), "[ff02::fb]:5353");
    }
}
