use std::fmt;

use thiserror::Error;

/// Boxed cause carried by the structured error types.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// Common, expected failure conditions. Compare them by value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    #[error("connection is closed")]
    ConnClosed,
    #[error("connection timed out")]
    ConnTimeout,
    #[error("invalid message format")]
    InvalidMessage,
    #[error("invalid response")]
    InvalidResponse,
    #[error("protocol error")]
    ProtocolError,
    #[error("frame exceeds maximum allowed size")]
    FrameTooLarge,
    #[error("frame is too small to be valid")]
    FrameTooSmall,
    #[error("invalid checksum")]
    InvalidChecksum,
    #[error("device reported an error")]
    DeviceError,
    #[error("buffer is too small")]
    BufferTooSmall,
}

/// A failure in message semantics: bad format, failed validation or a
/// fault reported by the device.
#[derive(Debug, Error)]
#[error("protocol error {code}: {message}{}", DisplayCause(.inner))]
pub struct ProtocolError {
    pub code: i32,
    pub message: String,
    #[source]
    pub inner: Option<Cause>,
}

impl ProtocolError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        ProtocolError {
            code,
            message: message.into(),
            inner: None,
        }
    }

    pub fn with_inner<E>(mut self, inner: E) -> Self
    where
        E: Into<Cause>,
    {
        self.inner = Some(inner.into());
        self
    }
}

/// A failure in the transport or session layer.
///
/// `op` names the step that failed (`connect`, `disconnect`, `write`,
/// `read`, `set_deadline`), `addr` the remote address as configured.
#[derive(Debug, Error)]
#[error("connection error during {op} to {addr}{}", DisplayCause(.inner))]
pub struct ConnError {
    pub op: &'static str,
    pub addr: String,
    #[source]
    pub inner: Option<Cause>,
}

impl ConnError {
    pub fn new(op: &'static str, addr: impl Into<String>) -> Self {
        ConnError {
            op,
            addr: addr.into(),
            inner: None,
        }
    }

    pub fn with_inner<E>(mut self, inner: E) -> Self
    where
        E: Into<Cause>,
    {
        self.inner = Some(inner.into());
        self
    }

    /// True if the cause is an I/O deadline expiring.
    ///
    /// Platforms disagree on the kind reported for an expired socket
    /// timeout, so both `WouldBlock` and `TimedOut` count.
    pub fn is_timeout(&self) -> bool {
        self.inner
            .as_ref()
            .and_then(|inner| inner.downcast_ref::<std::io::Error>())
            .map_or(false, |err| {
                matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                )
            })
    }
}

/// Every error this crate returns.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sentinel(#[from] Sentinel),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Conn(#[from] ConnError),
}

impl Error {
    /// Equality-style check against a sentinel condition.
    pub fn is(&self, sentinel: Sentinel) -> bool {
        matches!(self, Error::Sentinel(s) if *s == sentinel)
    }

    pub fn as_conn(&self) -> Option<&ConnError> {
        match self {
            Error::Conn(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

struct DisplayCause<'a>(&'a Option<Cause>);

impl fmt::Display for DisplayCause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(inner) => write!(f, ": {}", inner),
            None => Ok(()),
        }
    }
}
