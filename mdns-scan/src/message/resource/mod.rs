pub(crate) mod a;
pub(crate) mod aaaa;
pub(crate) mod ptr;
pub(crate) mod srv;
pub(crate) mod txt;

use std::fmt;

use bytes::Bytes;

pub use a::*;
pub use aaaa::*;
pub use ptr::*;
pub use srv::*;
pub use txt::*;

use super::name::*;
use super::packer::*;
use super::*;
use shared::error::*;

/// A Resource is a DNS resource record.
///
/// `raw` always holds the rdata exactly as received, whatever `body` was
/// decoded into.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Resource {
    pub header: ResourceHeader,
    pub body: ResourceBody,
    pub raw: Bytes,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} payload={}", self.header, self.body)
    }
}

impl Resource {
    /// Decodes one record at `off` and returns the offset of the next one.
    ///
    /// The returned offset is always the rdata start plus the declared rdata
    /// length, no matter how much of the rdata the typed decoder looked at.
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let off = self.header.unpack(msg, off)?;
        let length = self.header.length as usize;
        let (rdata, end) = unpack_bytes(msg, off, length)?;
        self.raw = Bytes::copy_from_slice(rdata);
        self.body = ResourceBody::unpack(self.header.typ, msg, off, length, &self.raw)?;
        Ok(end)
    }
}

/// Header for a DNS resource record.
///
/// A `ResourceHeader` contains the common fields that appear at the beginning
/// of every DNS resource record (RR). While there are many types of resource
/// records (A, AAAA, PTR, SRV, etc.), they all share this same header format.
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      NAME                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     RDATA                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ResourceHeader {
    /// The domain name for which this resource record pertains.
    pub name: String,

    /// The type of DNS resource record (e.g., A, AAAA, PTR).
    pub typ: DnsType,

    /// The class of network to which this record pertains.
    ///
    /// In mDNS answers the top bit is the cache-flush flag, so this is
    /// frequently `IN|0x8000` rather than plain [`DNSCLASS_INET`].
    pub class: DnsClass,

    /// Time to live in seconds. Zero announces that the record is going away
    /// (RFC 6762 section 10.1).
    pub ttl: u32,

    /// Length of the resource data (RDATA) following this header.
    pub length: u16,
}

impl fmt::Display for ResourceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} class={} name='{}' ttl={}",
            self.typ, self.class, self.name, self.ttl,
        )
    }
}

impl ResourceHeader {
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (new_off, labels) = resolve_labels(msg, off, None, true);
        self.name = labels.join(".");
        let new_off = self.typ.unpack(msg, new_off)?;
        let new_off = self.class.unpack(msg, new_off)?;
        let (ttl, new_off) = unpack_uint32(msg, new_off)?;
        self.ttl = ttl;
        let (l, new_off) = unpack_uint16(msg, new_off)?;
        self.length = l;

        Ok(new_off)
    }
}

/// A ResourceBody is a DNS resource record minus the header, decoded
/// according to the record type. Types without a decoder are kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBody {
    A(AResource),
    Aaaa(AaaaResource),
    Ptr(PtrResource),
    Txt(TxtResource),
    Srv(SrvResource),
    Unknown(Bytes),
}

impl Default for ResourceBody {
    fn default() -> Self {
        ResourceBody::Unknown(Bytes::new())
    }
}

impl fmt::Display for ResourceBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceBody::A(r) => write!(f, "{r}"),
            ResourceBody::Aaaa(r) => write!(f, "{r}"),
            ResourceBody::Ptr(r) => write!(f, "{r}"),
            ResourceBody::Txt(r) => write!(f, "{r}"),
            ResourceBody::Srv(r) => write!(f, "{r}"),
            ResourceBody::Unknown(raw) => write!(f, "{{{} bytes rdata}}", raw.len()),
        }
    }
}

impl ResourceBody {
    /// The record type this body decodes, or `None` for opaque data.
    pub fn real_type(&self) -> Option<DnsType> {
        match self {
            ResourceBody::A(_) => Some(DnsType::A),
            ResourceBody::Aaaa(_) => Some(DnsType::AAAA),
            ResourceBody::Ptr(_) => Some(DnsType::PTR),
            ResourceBody::Txt(_) => Some(DnsType::TXT),
            ResourceBody::Srv(_) => Some(DnsType::SRV),
            ResourceBody::Unknown(_) => None,
        }
    }

    // unpack decodes the rdata of `length` bytes at off. `raw` is that same
    // slice, already copied out for the record.
    pub(crate) fn unpack(
        typ: DnsType,
        msg: &[u8],
        off: usize,
        length: usize,
        raw: &Bytes,
    ) -> Result<Self> {
        let body = match typ {
            DnsType::A => {
                let mut r = AResource::default();
                r.unpack(msg, off, length)?;
                ResourceBody::A(r)
            }
            DnsType::AAAA => {
                let mut r = AaaaResource::default();
                r.unpack(msg, off, length)?;
                ResourceBody::Aaaa(r)
            }
            DnsType::PTR => {
                let mut r = PtrResource::default();
                r.unpack(msg, off, length)?;
                ResourceBody::Ptr(r)
            }
            DnsType::TXT => {
                let mut r = TxtResource::default();
                r.unpack(msg, off, length)?;
                ResourceBody::Txt(r)
            }
            DnsType::SRV => {
                let mut r = SrvResource::default();
                r.unpack(msg, off, length)?;
                ResourceBody::Srv(r)
            }
            _ => ResourceBody::Unknown(raw.clone()),
        };
        Ok(body)
    }
}

// rdata_end is the offset just past the rdata of `length` bytes at off.
fn rdata_end(msg: &[u8], off: usize, length: usize) -> Result<usize> {
    let (_, end) = unpack_bytes(msg, off, length)?;
    Ok(end)
}
