use std::fmt;

use super::packer::*;
use super::*;
use shared::error::*;

/// The fixed 12 byte header at the start of every DNS message
/// (RFC 1035 section 4.1.1).
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ANCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    NSCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The flag word is kept as received; the accessors below decompose it.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub questions: u16,
    pub answers: u16,
    pub authorities: u16,
    pub additionals: u16,
}

impl Header {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (id, off) = unpack_uint16(msg, off)?;
        let (flags, off) = unpack_uint16(msg, off)?;
        let (questions, off) = unpack_uint16(msg, off)?;
        let (answers, off) = unpack_uint16(msg, off)?;
        let (authorities, off) = unpack_uint16(msg, off)?;
        let (additionals, off) = unpack_uint16(msg, off)?;
        *self = Header {
            id,
            flags,
            questions,
            answers,
            authorities,
            additionals,
        };
        Ok(off)
    }

    pub fn is_response(&self) -> bool {
        self.flags & HEADER_BIT_QR != 0
    }

    pub fn opcode(&self) -> OpCode {
        OpCode::from((self.flags & HEADER_MASK_OPCODE) >> 11)
    }

    pub fn is_authoritative(&self) -> bool {
        self.flags & HEADER_BIT_AA != 0
    }

    pub fn is_truncated(&self) -> bool {
        self.flags & HEADER_BIT_TC != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & HEADER_BIT_RD != 0
    }

    pub fn recursion_available(&self) -> bool {
        self.flags & HEADER_BIT_RA != 0
    }

    /// The reserved Z bit; zero in every well-formed message.
    pub fn zero(&self) -> bool {
        self.flags & HEADER_BIT_Z != 0
    }

    pub fn authenticated_data(&self) -> bool {
        self.flags & HEADER_BIT_AD != 0
    }

    pub fn checking_disabled(&self) -> bool {
        self.flags & HEADER_BIT_CD != 0
    }

    pub fn rcode(&self) -> RCode {
        RCode::from(self.flags & HEADER_MASK_RCODE)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = format!("{} {}", self.opcode(), self.rcode());
        let bits = [
            (self.is_response(), "response"),
            (self.is_authoritative(), "authoritative"),
            (self.is_truncated(), "truncated"),
            (self.recursion_desired(), "recursion_desired"),
            (self.recursion_available(), "recursion_available"),
            (self.authenticated_data(), "authenticated"),
            (self.checking_disabled(), "checking_disabled"),
        ];
        for (set, name) in bits {
            if set {
                s += " ";
                s += name;
            }
        }

        write!(
            f,
            "ID:{} Flags:{{{}}} Question:{} Answer:{} Authority:{} Additional:{}",
            self.id, s, self.questions, self.answers, self.authorities, self.additionals
        )
    }
}
