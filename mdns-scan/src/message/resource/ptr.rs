use std::fmt;

use super::*;

/// A PtrResource is a PTR Resource record. In DNS-SD this names a service
/// instance for a browsed service type.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PtrResource {
    pub ptr: String,
}

impl fmt::Display for PtrResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ptr)
    }
}

impl PtrResource {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, length: usize) -> Result<usize> {
        let end = rdata_end(msg, off, length)?;
        let (_, labels) = resolve_labels(msg, off, Some(end), true);
        self.ptr = labels.join(".");
        Ok(end)
    }
}
