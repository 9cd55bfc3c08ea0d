use std::fmt;

use super::*;

/// An SrvResource is an SRV Resource record (RFC 2782).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SrvResource {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    /// Not compressed as per RFC 2782, though mDNS responders often do anyway.
    pub target: String,
}

impl fmt::Display for SrvResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{priority={} weight={} port={} target='{}'}}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

impl SrvResource {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, length: usize) -> Result<usize> {
        let end = rdata_end(msg, off, length)?;
        let (priority, new_off) = unpack_uint16(msg, off)?;
        self.priority = priority;
        let (weight, new_off) = unpack_uint16(msg, new_off)?;
        self.weight = weight;
        let (port, new_off) = unpack_uint16(msg, new_off)?;
        self.port = port;

        // empty when the rdata is too short to hold a target
        let (_, labels) = resolve_labels(msg, new_off, Some(end), true);
        self.target = labels.join(".");
        Ok(end)
    }
}
