use std::fmt;
use std::net::Ipv6Addr;

use super::*;

const IPV6_LEN: usize = 16;

/// An AAAAResource is an AAAA Resource record (RFC 3596).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaaaResource {
    pub aaaa: Ipv6Addr,
}

impl Default for AaaaResource {
    fn default() -> Self {
        AaaaResource {
            aaaa: Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl fmt::Display for AaaaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.aaaa)
    }
}

impl AaaaResource {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, length: usize) -> Result<usize> {
        let (b, _) = unpack_bytes(msg, off, IPV6_LEN)?;
        let mut octets = [0u8; IPV6_LEN];
        octets.copy_from_slice(b);
        self.aaaa = Ipv6Addr::from(octets);
        rdata_end(msg, off, length)
    }
}
