use super::error::Result;

/// A single protocol message: an encoded payload tagged with a type or
/// function identifier.
pub trait Frame {
    /// Returns the encoded bytes of the frame.
    fn marshal_binary(&self) -> Result<Vec<u8>>;

    /// The encoded size in bytes, derived from [`Frame::marshal_binary`].
    /// `None` if marshaling fails.
    fn size(&self) -> Option<usize> {
        self.marshal_binary().ok().map(|data| data.len())
    }

    /// The frame type / function identifier.
    fn frame_type(&self) -> i32;
}

/// A frame that can also be rebuilt from wire bytes.
pub trait UnmarshalFrame: Frame {
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<()>;
}

/// Already-encoded payload plus type tag.
///
/// The payload is returned verbatim by `marshal_binary`: no framing,
/// checksum or length prefix. This frame is write only; use [`RawFrame`]
/// where bytes must be decoded into a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseFrame {
    data: Vec<u8>,
    frame_type: u8,
}

impl BaseFrame {
    pub fn new(data: impl Into<Vec<u8>>, frame_type: u8) -> Self {
        BaseFrame {
            data: data.into(),
            frame_type,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Frame for BaseFrame {
    fn marshal_binary(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn size(&self) -> Option<usize> {
        Some(self.data.len())
    }

    fn frame_type(&self) -> i32 {
        i32::from(self.frame_type)
    }
}

/// Verbatim payload frame that supports decoding. Unmarshaling replaces
/// the payload and keeps the type tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    data: Vec<u8>,
    frame_type: i32,
}

impl RawFrame {
    pub fn new(data: impl Into<Vec<u8>>, frame_type: i32) -> Self {
        RawFrame {
            data: data.into(),
            frame_type,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Frame for RawFrame {
    fn marshal_binary(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn frame_type(&self) -> i32 {
        self.frame_type
    }
}

impl UnmarshalFrame for RawFrame {
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<()> {
        self.data.clear();
        self.data.extend_from_slice(data);
        Ok(())
    }
}
