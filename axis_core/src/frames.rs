//! Wire shapes of the upstream command link
//!
//! The host sends fixed 7-byte records: one header byte followed by a 6-byte
//! payload. Once the header is stripped the payload is interpreted by the
//! receiving board as three signed 16-bit values (per-axis targets or
//! velocities). This module fixes the three shapes and the header split;
//! turning a payload into command values is left to the protocol layer.
//!
//! All three types are plain old data so they can be viewed as raw bytes
//! without copying.

use crate::error::{AxisError, AxisResult};
use bytemuck::{Pod, Zeroable};

/// Bytes in a raw serial record, header included
pub const SERIAL_FRAME_LEN: usize = 7;
/// Bytes in a record once the header is removed
pub const PAYLOAD_LEN: usize = 6;
/// Signed 16-bit values in a structured command
pub const COMMAND_VALUES: usize = 3;

/// Raw record as received from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct SerialFrame {
    pub header: u8,
    pub payload: [u8; PAYLOAD_LEN],
}

/// Payload bytes with the header removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PayloadFrame {
    pub bytes: [u8; PAYLOAD_LEN],
}

/// Structured command: three signed 16-bit values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct CommandFrame {
    pub values: [i16; COMMAND_VALUES],
}

const _: () = assert!(std::mem::size_of::<SerialFrame>() == SERIAL_FRAME_LEN);
const _: () = assert!(std::mem::size_of::<PayloadFrame>() == PAYLOAD_LEN);
const _: () = assert!(std::mem::size_of::<CommandFrame>() == PAYLOAD_LEN);

fn read_exact<T: Pod>(bytes: &[u8]) -> AxisResult<T> {
    let expected = std::mem::size_of::<T>();
    if bytes.len() != expected {
        return Err(AxisError::Frame {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

impl SerialFrame {
    pub fn new(header: u8, payload: [u8; PAYLOAD_LEN]) -> Self {
        Self { header, payload }
    }

    /// Build from exactly [`SERIAL_FRAME_LEN`] bytes
    pub fn from_bytes(bytes: &[u8]) -> AxisResult<Self> {
        read_exact(bytes)
    }

    /// Strip the header, leaving the payload unchanged
    pub fn payload(&self) -> PayloadFrame {
        PayloadFrame {
            bytes: self.payload,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl PayloadFrame {
    pub fn new(bytes: [u8; PAYLOAD_LEN]) -> Self {
        Self { bytes }
    }

    /// Build from exactly [`PAYLOAD_LEN`] bytes
    pub fn from_bytes(bytes: &[u8]) -> AxisResult<Self> {
        read_exact(bytes)
    }

    /// Prepend a header byte to form a full serial record
    pub fn with_header(&self, header: u8) -> SerialFrame {
        SerialFrame::new(header, self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<SerialFrame> for PayloadFrame {
    fn from(frame: SerialFrame) -> Self {
        frame.payload()
    }
}

impl CommandFrame {
    pub fn new(values: [i16; COMMAND_VALUES]) -> Self {
        Self { values }
    }

    /// Reinterpret exactly [`PAYLOAD_LEN`] bytes in native byte order, the
    /// same layout the record has in the receiving board's memory
    pub fn from_bytes(bytes: &[u8]) -> AxisResult<Self> {
        read_exact(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
