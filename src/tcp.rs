use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info};

use super::config::TransportOptions;
use super::conn::{Conn, TransportProvider};
use super::error::{ConnError, Result, Sentinel};

/// Blocking request/response connection over a single TCP socket.
///
/// Each `send` writes the whole payload, then performs exactly one read of
/// at most `max_frame_size` bytes. There is no framing: a response longer
/// than the buffer is truncated and one that arrives in several segments
/// may come back incomplete. Layer a [`Protocol`](crate::Protocol) on top
/// to interpret the bytes.
///
/// The timeout bounds each socket call, not the exchange as a whole: a
/// payload the kernel accepts in several partial writes may take up to one
/// timeout per write before the read starts.
#[derive(Debug)]
pub struct TcpConn {
    options: TransportOptions,
    stream: Option<TcpStream>,
    connected: bool,
}

impl TcpConn {
    pub fn new(options: TransportOptions) -> Self {
        TcpConn {
            options,
            stream: None,
            connected: false,
        }
    }

    /// Connection to `address` with default options and the given timeout.
    pub fn with_address(address: impl Into<String>, timeout: Duration) -> Self {
        Self::new(TransportOptions::new(address).with_timeout(timeout))
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    fn error(&self, op: &'static str, err: std::io::Error) -> ConnError {
        ConnError::new(op, self.options.address.as_str()).with_inner(err)
    }

    /// The open socket and the configured address, or `ConnClosed`.
    fn stream_parts(&mut self) -> Result<(&mut TcpStream, &str)> {
        match self.stream.as_mut() {
            Some(stream) if self.connected => Ok((stream, self.options.address.as_str())),
            _ => Err(Sentinel::ConnClosed.into()),
        }
    }

    fn dial(&self) -> std::io::Result<TcpStream> {
        let mut last_error = std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "address resolved to no socket addresses",
        );
        for socket_address in self.options.address.to_socket_addrs()? {
            debug!("try to connect to {:?}", socket_address);
            // a zero timeout means no connect deadline
            let attempt = if self.options.timeout.is_zero() {
                TcpStream::connect(socket_address)
            } else {
                TcpStream::connect_timeout(&socket_address, self.options.timeout)
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!("connect to {:?} failed: {}", socket_address, err);
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

impl Conn for TcpConn {
    fn open(&mut self) -> Result<()> {
        if self.is_open() {
            debug!("{} is already open", self.options.address);
            return Ok(());
        }
        let stream = self.dial().map_err(|err| self.error("connect", err))?;
        info!("connected to {}", self.options.address);
        self.stream = Some(stream);
        self.connected = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => return Ok(()),
        };
        self.connected = false;
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            // the peer already went away; the socket is released on drop
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {}
            Err(err) => return Err(self.error("disconnect", err).into()),
        }
        info!("disconnected from {}", self.options.address);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.connected && self.stream.is_some()
    }

    fn send(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let timeout = self.options.timeout;
        self.send_with_timeout(data, timeout)
    }

    fn send_with_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        let max_frame_size = self.options.max_frame_size;
        let (stream, address) = self.stream_parts()?;
        let fail =
            |op: &'static str, err: std::io::Error| ConnError::new(op, address).with_inner(err);

        stream
            .set_write_timeout(Some(timeout))
            .map_err(|err| fail("set_deadline", err))?;
        stream.write_all(data).map_err(|err| fail("write", err))?;
        debug!("sent {} bytes to {}", data.len(), address);

        stream
            .set_read_timeout(Some(timeout))
            .map_err(|err| fail("set_deadline", err))?;
        let mut buffer = vec![0; max_frame_size];
        let n = stream.read(&mut buffer).map_err(|err| fail("read", err))?;
        if n == 0 && !buffer.is_empty() {
            return Err(fail(
                "read",
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by peer",
                ),
            )
            .into());
        }
        if n == buffer.len() {
            debug!(
                "response from {} filled the {} byte buffer and may be truncated",
                address, n
            );
        }
        buffer.truncate(n);
        debug!("received {} bytes from {}", n, address);
        Ok(buffer)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let timeout = self.options.timeout;
        let (stream, address) = self.stream_parts()?;
        let fail =
            |op: &'static str, err: std::io::Error| ConnError::new(op, address).with_inner(err);

        stream
            .set_read_timeout(Some(timeout))
            .map_err(|err| fail("set_deadline", err))?;
        let n = stream.read(buf).map_err(|err| fail("read", err))?;
        debug!("read {} bytes from {}", n, address);
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let timeout = self.options.timeout;
        let (stream, address) = self.stream_parts()?;
        let fail =
            |op: &'static str, err: std::io::Error| ConnError::new(op, address).with_inner(err);

        stream
            .set_write_timeout(Some(timeout))
            .map_err(|err| fail("set_deadline", err))?;
        let n = stream.write(data).map_err(|err| fail("write", err))?;
        debug!("wrote {} bytes to {}", n, address);
        Ok(n)
    }
}

impl Drop for TcpConn {
    fn drop(&mut self) {
        if self.stream.is_some() {
            let _ = self.close();
        }
    }
}

/// [`TransportProvider`] building [`TcpConn`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProvider;

impl TransportProvider for TcpProvider {
    fn create_conn(&self, options: TransportOptions) -> Result<Box<dyn Conn>> {
        Ok(Box::new(TcpConn::new(options)))
    }
}
