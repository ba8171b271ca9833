//! Big-endian readers for the fixed-width fields of a frame.
//!
//! Every reader either decodes the leading bytes of the buffer or fails
//! with [`Sentinel::BufferTooSmall`]. Nothing is read partially.

use super::error::{Result, Sentinel};

/// The first `N` bytes of `data`.
fn leading<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| Sentinel::BufferTooSmall.into())
}

/// Reads the byte at `offset`.
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or_else(|| Sentinel::BufferTooSmall.into())
}

pub fn read_u16(data: &[u8]) -> Result<u16> {
    leading(data).map(u16::from_be_bytes)
}

pub fn read_u32(data: &[u8]) -> Result<u32> {
    leading(data).map(u32::from_be_bytes)
}

pub fn read_u64(data: &[u8]) -> Result<u64> {
    leading(data).map(u64::from_be_bytes)
}
