#![allow(dead_code)]

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    //Message decoding
    /// A fixed size field (header word, type, class, TTL or rdata length)
    /// extends past the end of the message.
    #[error("insufficient data for base length type")]
    ErrBaseLen,
    /// A resource record's rdata, or the fixed size payload its type reads,
    /// extends past the end of the message.
    #[error("insufficient data for resource body length")]
    ErrResourceLen,

    //Transport
    #[error("i/o timeout")]
    ErrTimeout,

    //Interfaces
    #[error("no interface is available")]
    ErrNoInterface,
    #[error("interface not found: {0}")]
    ErrInterfaceNotFound(String),

    #[error("{0}")]
    Io(#[source] IoError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Reports whether the error means the datagram itself was malformed, as
    /// opposed to a local socket or configuration failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::ErrBaseLen | Error::ErrResourceLen)
    }

    /// Reports whether the error is the periodic read deadline expiring.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::ErrTimeout => true,
            Error::Io(IoError(e)) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Self {
        Error::Io(IoError(io::Error::from(e)))
    }
}

/// flatten_errs flattens multiple errors into one
pub fn flatten_errs(errs: Vec<impl Into<Error>>) -> Result<()> {
    if errs.is_empty() {
        Ok(())
    } else {
        let errs_strs: Vec<String> = errs.into_iter().map(|e| e.into().to_string()).collect();
        Err(Error::Other(errs_strs.join("\n")))
    }
}
