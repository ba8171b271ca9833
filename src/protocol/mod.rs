use super::error::Result;
use super::frame::Frame;

/// This trait represents the wire format spoken over a connection.
///
/// `encode` and `decode` are pure transformations and do no I/O. The
/// framing details (headers, function codes, checksums) all live in the
/// implementation; the transport only moves the bytes.
///
/// # Example
/// A protocol where the first byte is the function code and the rest is
/// the payload:
/// ```
/// use device_link::{Frame, ProtocolError, Protocol, RawFrame, Result, Sentinel};
///
/// struct FunctionCode;
///
/// impl Protocol for FunctionCode {
///     type Frame = RawFrame;
///
///     fn encode(&self, frame: &RawFrame) -> Result<Vec<u8>> {
///         let mut bytes = vec![frame.frame_type() as u8];
///         bytes.extend_from_slice(frame.data());
///         Ok(bytes)
///     }
///
///     fn decode(&self, data: &[u8]) -> Result<RawFrame> {
///         match data.split_first() {
///             Some((&code, payload)) => Ok(RawFrame::new(payload, i32::from(code))),
///             None => Err(Sentinel::FrameTooSmall.into()),
///         }
///     }
///
///     fn validate(&self, request: &RawFrame, response: &RawFrame) -> Result<()> {
///         if request.frame_type() != response.frame_type() {
///             return Err(ProtocolError::new(1, "function code mismatch").into());
///         }
///         Ok(())
///     }
/// }
///
/// let bytes = FunctionCode.encode(&RawFrame::new(vec![0, 1], 3)).unwrap();
/// assert_eq!(bytes, vec![3, 0, 1]);
/// ```
pub trait Protocol {
    /// The frame type this protocol produces and consumes.
    type Frame: Frame;

    /// Converts a frame into raw bytes ready for the transport.
    fn encode(&self, frame: &Self::Frame) -> Result<Vec<u8>>;

    /// Parses raw bytes received from the transport into a frame.
    fn decode(&self, data: &[u8]) -> Result<Self::Frame>;

    /// Checks a response against the request that produced it, e.g.
    /// matching transaction ids or function codes. Fails with a
    /// [`ProtocolError`](crate::ProtocolError) describing the mismatch.
    fn validate(&self, request: &Self::Frame, response: &Self::Frame) -> Result<()>;
}
