use std::fmt;

use super::*;

/// A TxtResource is a TXT Resource record.
///
/// The character strings are joined with a single space. They are never
/// treated as compressed names, so a string whose length byte looks like a
/// pointer prefix is still read as text.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TxtResource {
    pub txt: String,
}

impl fmt::Display for TxtResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.txt)
    }
}

impl TxtResource {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, length: usize) -> Result<usize> {
        let end = rdata_end(msg, off, length)?;
        let (_, strings) = resolve_labels(msg, off, Some(end), false);
        self.txt = strings.join(" ");
        Ok(end)
    }
}
