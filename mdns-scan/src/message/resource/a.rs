use std::fmt;
use std::net::Ipv4Addr;

use super::*;

const IPV4_LEN: usize = 4;

/// An AResource is an A Resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AResource {
    pub a: Ipv4Addr,
}

impl Default for AResource {
    fn default() -> Self {
        AResource {
            a: Ipv4Addr::UNSPECIFIED,
        }
    }
}

impl fmt::Display for AResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.a)
    }
}

impl AResource {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, length: usize) -> Result<usize> {
        let (b, _) = unpack_bytes(msg, off, IPV4_LEN)?;
        self.a = Ipv4Addr::new(b[0], b[1], b[2], b[3]);
        rdata_end(msg, off, length)
    }
}
