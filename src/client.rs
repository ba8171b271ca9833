use std::time::Duration;

use log::debug;

use super::conn::{Client, Conn};
use super::error::Result;
use super::frame::Frame;
use super::protocol::Protocol;

/// Protocol-aware client: encodes frames with `P`, exchanges them over `C`
/// and checks every response against its request.
#[derive(Debug)]
pub struct FrameClient<P, C> {
    protocol: P,
    conn: C,
}

impl<P: Protocol, C: Conn> FrameClient<P, C> {
    pub fn new(protocol: P, conn: C) -> Self {
        FrameClient { protocol, conn }
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn conn(&self) -> &C {
        &self.conn
    }

    pub fn into_parts(self) -> (P, C) {
        (self.protocol, self.conn)
    }

    /// Sends `request` and returns the validated response, using the
    /// connection's default timeout.
    pub fn request(&mut self, request: &P::Frame) -> Result<P::Frame> {
        let data = self.protocol.encode(request)?;
        let response = self.conn.send(&data)?;
        self.finish(request, &response)
    }

    pub fn request_with_timeout(
        &mut self,
        request: &P::Frame,
        timeout: Duration,
    ) -> Result<P::Frame> {
        let data = self.protocol.encode(request)?;
        let response = self.conn.send_with_timeout(&data, timeout)?;
        self.finish(request, &response)
    }

    fn finish(&self, request: &P::Frame, response: &[u8]) -> Result<P::Frame> {
        let response = self.protocol.decode(response)?;
        self.protocol.validate(request, &response)?;
        debug!(
            "request type {} answered with type {}",
            request.frame_type(),
            response.frame_type()
        );
        Ok(response)
    }
}

impl<P: Protocol, C: Conn> Client for FrameClient<P, C> {
    fn connect(&mut self) -> Result<()> {
        self.conn.open()
    }

    fn disconnect(&mut self) -> Result<()> {
        self.conn.close()
    }

    fn is_connected(&self) -> bool {
        self.conn.is_open()
    }
}
