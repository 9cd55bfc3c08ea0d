use super::{UINT16LEN, UINT32LEN};
use shared::error::*;

// unpack_uint16 reads a big endian uint16 at off and returns it with the
// offset just past it.
pub(crate) fn unpack_uint16(msg: &[u8], off: usize) -> Result<(u16, usize)> {
    let end = off.checked_add(UINT16LEN).ok_or(Error::ErrBaseLen)?;
    if end > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    Ok((u16::from_be_bytes([msg[off], msg[off + 1]]), end))
}

// unpack_uint32 reads a big endian uint32 at off and returns it with the
// offset just past it.
pub(crate) fn unpack_uint32(msg: &[u8], off: usize) -> Result<(u32, usize)> {
    let end = off.checked_add(UINT32LEN).ok_or(Error::ErrBaseLen)?;
    if end > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    Ok((
        u32::from_be_bytes([msg[off], msg[off + 1], msg[off + 2], msg[off + 3]]),
        end,
    ))
}

// unpack_bytes borrows the n bytes at off, failing with ErrResourceLen when
// they run past the end of msg.
pub(crate) fn unpack_bytes(msg: &[u8], off: usize, n: usize) -> Result<(&[u8], usize)> {
    let end = off.checked_add(n).ok_or(Error::ErrResourceLen)?;
    if end > msg.len() {
        return Err(Error::ErrResourceLen);
    }
    Ok((&msg[off..end], end))
}
