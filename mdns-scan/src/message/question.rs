use std::fmt;

use super::name::*;
use super::*;
use shared::error::Result;

/// A question is a DNS query. mDNS senders put the names they probe or query
/// for here; responses usually leave the section empty.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Question {
    pub name: String,
    pub typ: DnsType,
    pub class: DnsClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} class={} name='{}'",
            self.typ, self.class, self.name
        )
    }
}

impl Question {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (off, labels) = resolve_labels(msg, off, None, true);
        self.name = labels.join(".");
        let off = self.typ.unpack(msg, off)?;
        self.class.unpack(msg, off)
    }
}
