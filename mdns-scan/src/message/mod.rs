
pub(crate) mod header;
pub(crate) mod name;
mod packer;
pub(crate) mod question;
pub(crate) mod resource;

use std::fmt;

use header::*;
use packer::*;
use question::*;
use resource::*;

use shared::error::*;

// Message formats

/// A Type is the type of a DNS question or resource record
/// (RFC 1035 section 3.2.2, RFC 3596 section 2.1, RFC 2782).
///
/// Any 16 bit value is representable; the associated constants name the ones
/// this crate knows about.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DnsType(pub u16);

impl DnsType {
    pub const A: DnsType = DnsType(1);
    pub const NS: DnsType = DnsType(2);
    pub const CNAME: DnsType = DnsType(5);
    pub const SOA: DnsType = DnsType(6);
    pub const NULL: DnsType = DnsType(10);
    pub const WKS: DnsType = DnsType(11);
    pub const PTR: DnsType = DnsType(12);
    pub const HINFO: DnsType = DnsType(13);
    pub const MINFO: DnsType = DnsType(14);
    pub const MX: DnsType = DnsType(15);
    pub const TXT: DnsType = DnsType(16);
    pub const AAAA: DnsType = DnsType(28);
    pub const SRV: DnsType = DnsType(33);
    pub const ANY: DnsType = DnsType(255);

    /// Mnemonic for the type, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        let s = match *self {
            DnsType::A => "A",
            DnsType::NS => "NS",
            DnsType::CNAME => "CNAME",
            DnsType::SOA => "SOA",
            DnsType::NULL => "NULL",
            DnsType::WKS => "WKS",
            DnsType::PTR => "PTR",
            DnsType::HINFO => "HINFO",
            DnsType::MINFO => "MINFO",
            DnsType::MX => "MX",
            DnsType::TXT => "TXT",
            DnsType::AAAA => "AAAA",
            DnsType::SRV => "SRV",
            DnsType::ANY => "ANY",
            _ => return None,
        };
        Some(s)
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (t, o) = unpack_uint16(msg, off)?;
        *self = DnsType(t);
        Ok(o)
    }
}

impl From<u16> for DnsType {
    fn from(v: u16) -> Self {
        DnsType(v)
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// DNS class of a question or resource record (RFC 1035 section 3.2.4).
///
/// mDNS reuses the top bit: in questions it asks for a unicast response, in
/// answers it marks the record set as a cache flush (RFC 6762 sections 5.4 and
/// 10.2). The raw value is kept as received.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DnsClass(pub u16);

/// Internet class (IN)
pub const DNSCLASS_INET: DnsClass = DnsClass(1);

/// CHAOS class (CH)
pub const DNSCLASS_CHAOS: DnsClass = DnsClass(3);

/// Hesiod class (HS)
pub const DNSCLASS_HESIOD: DnsClass = DnsClass(4);

const DNSCLASS_MDNS_BIT: u16 = 1 << 15;

impl DnsClass {
    /// Mnemonic for the class, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            DNSCLASS_INET => Some("IN"),
            DNSCLASS_CHAOS => Some("CH"),
            DNSCLASS_HESIOD => Some("HS"),
            _ => None,
        }
    }

    /// The unicast-response (question) or cache-flush (record) bit.
    pub fn mdns_bit(&self) -> bool {
        self.0 & DNSCLASS_MDNS_BIT != 0
    }

    /// The class with the mDNS bit cleared.
    pub fn base(&self) -> DnsClass {
        DnsClass(self.0 & !DNSCLASS_MDNS_BIT)
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (c, o) = unpack_uint16(msg, off)?;
        *self = DnsClass(c);
        Ok(o)
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.base().name()) {
            (Some(s), _) => write!(f, "{s}"),
            (None, Some(s)) if self.mdns_bit() => write!(f, "{s}|0x8000"),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// An OpCode is a DNS operation code (RFC 6895 section 2.2).
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpCode {
    #[default]
    Query,
    Status,
    Notify,
    Update,
    Dso,
    Unassigned(u16),
}

impl From<u16> for OpCode {
    fn from(v: u16) -> Self {
        match v {
            0 => OpCode::Query,
            2 => OpCode::Status,
            4 => OpCode::Notify,
            5 => OpCode::Update,
            6 => OpCode::Dso,
            _ => OpCode::Unassigned(v),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            OpCode::Query => "QUERY",
            OpCode::Status => "STATUS",
            OpCode::Notify => "NOTIFY",
            OpCode::Update => "UPDATE",
            OpCode::Dso => "DSO",
            OpCode::Unassigned(_) => "UNASSIGNED",
        };
        write!(f, "{s}")
    }
}

/// An RCode is a DNS response status code (RFC 1035 section 4.1.1,
/// RFC 2136 section 2.2).
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RCode {
    #[default]
    Success,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    YxDomain,
    YxRrSet,
    NxRrSet,
    NotAuth,
    NotZone,
    Unassigned(u16),
}

impl From<u16> for RCode {
    fn from(v: u16) -> Self {
        match v {
            0 => RCode::Success,
            1 => RCode::FormatError,
            2 => RCode::ServerFailure,
            3 => RCode::NameError,
            4 => RCode::NotImplemented,
            5 => RCode::Refused,
            6 => RCode::YxDomain,
            7 => RCode::YxRrSet,
            8 => RCode::NxRrSet,
            9 => RCode::NotAuth,
            10 => RCode::NotZone,
            _ => RCode::Unassigned(v),
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RCode::Success => "NOERROR",
            RCode::FormatError => "FORMERR",
            RCode::ServerFailure => "SERVFAIL",
            RCode::NameError => "NXDOMAIN",
            RCode::NotImplemented => "NOTIMP",
            RCode::Refused => "REFUSED",
            RCode::YxDomain => "YXDOMAIN",
            RCode::YxRrSet => "YXRRSET",
            RCode::NxRrSet => "NXRRSET",
            RCode::NotAuth => "NOTAUTH",
            RCode::NotZone => "NOTZONE",
            RCode::Unassigned(_) => "UNASSIGNED",
        };
        write!(f, "{s}")
    }
}

// Internal constants.

// UINT16LEN is the length (in bytes) of a uint16.
const UINT16LEN: usize = 2;

// UINT32LEN is the length (in bytes) of a uint32.
const UINT32LEN: usize = 4;

const HEADER_BIT_QR: u16 = 1 << 15; // query/response (response=1)
const HEADER_MASK_OPCODE: u16 = 0xF << 11;
const HEADER_BIT_AA: u16 = 1 << 10; // authoritative
const HEADER_BIT_TC: u16 = 1 << 9; // truncated
const HEADER_BIT_RD: u16 = 1 << 8; // recursion desired
const HEADER_BIT_RA: u16 = 1 << 7; // recursion available
const HEADER_BIT_Z: u16 = 1 << 6; // reserved
const HEADER_BIT_AD: u16 = 1 << 5; // authenticated data
const HEADER_BIT_CD: u16 = 1 << 4; // checking disabled
const HEADER_MASK_RCODE: u16 = 0xF;

const INDENT: &str = "  ";

/// Message is a decoded DNS message. Sections keep wire order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Resource>,
    pub authorities: Vec<Resource>,
    pub additionals: Vec<Resource>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{INDENT}Header:")?;
        writeln!(f, "{INDENT}{INDENT}{}", self.header)?;

        if !self.questions.is_empty() {
            writeln!(f, "{INDENT}Questions:")?;
            for q in &self.questions {
                writeln!(f, "{INDENT}{INDENT}{q}")?;
            }
        }

        let sections = [
            ("Answers", &self.answers),
            ("Authority", &self.authorities),
            ("Additional", &self.additionals),
        ];
        for (title, records) in sections {
            if records.is_empty() {
                continue;
            }
            writeln!(f, "{INDENT}{title}:")?;
            for r in records {
                writeln!(f, "{INDENT}{INDENT}{r}")?;
            }
        }
        Ok(())
    }
}

impl Message {
    /// Decodes a full message from `msg`.
    ///
    /// Fails with a malformed-message error ([`Error::is_malformed`]) as soon
    /// as a fixed size field or a record's rdata would run past the end of the
    /// buffer. Header counts are trusted as given; on success every section
    /// holds exactly as many entries as its count field.
    pub fn unpack(&mut self, msg: &[u8]) -> Result<()> {
        let mut off = self.header.unpack(msg, 0)?;

        self.questions = Vec::new();
        for _ in 0..self.header.questions {
            let mut q = Question::default();
            off = q.unpack(msg, off)?;
            self.questions.push(q);
        }

        (self.answers, off) = unpack_resources(msg, off, self.header.answers)?;
        (self.authorities, off) = unpack_resources(msg, off, self.header.authorities)?;
        (self.additionals, _) = unpack_resources(msg, off, self.header.additionals)?;

        Ok(())
    }

    /// Convenience wrapper around [`Message::unpack`].
    pub fn decode(msg: &[u8]) -> Result<Self> {
        let mut m = Message::default();
        m.unpack(msg)?;
        Ok(m)
    }
}

fn unpack_resources(msg: &[u8], mut off: usize, count: u16) -> Result<(Vec<Resource>, usize)> {
    let mut resources = Vec::new();
    for _ in 0..count {
        let mut r = Resource::default();
        off = r.unpack(msg, off)?;
        resources.push(r);
    }
    Ok((resources, off))
}
