//! Building blocks for binary-protocol clients talking to devices over
//! pluggable transports.
//!
//! A [`TransportProvider`] turns [`TransportOptions`] into a [`Conn`]; a
//! [`Protocol`] turns [`Frame`]s into bytes and back. [`FrameClient`] ties
//! the two together, [`RetryConn`] adds an optional retry policy.
//!
//! ```no_run
//! use device_link::{Conn, TcpProvider, TransportOptions, TransportProvider};
//!
//! let options = TransportOptions::new("192.168.0.10:502").with_max_frame_size(260);
//! let mut conn = TcpProvider.create_conn(options)?;
//! conn.open()?;
//! let response = conn.send(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02])?;
//! println!("{:?}", response);
//! conn.close()?;
//! # Ok::<(), device_link::Error>(())
//! ```

mod binary;
mod client;
mod config;
mod conn;
mod error;
mod frame;
mod protocol;
mod retry;
mod tcp;

#[cfg(test)]
mod tests;

pub use self::binary::{read_u16, read_u32, read_u64, read_u8};
pub use self::client::FrameClient;
pub use self::config::{
    TransportOptions, DEFAULT_MAX_FRAME_SIZE, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
    DEFAULT_TIMEOUT,
};
pub use self::conn::{Client, Conn, Handler, StreamConn, Subscription, TransportProvider};
pub use self::error::{Cause, ConnError, Error, ProtocolError, Result, Sentinel};
pub use self::frame::{BaseFrame, Frame, RawFrame, UnmarshalFrame};
pub use self::protocol::Protocol;
pub use self::retry::RetryConn;
pub use self::tcp::{TcpConn, TcpProvider};
