//! Frame codec: command templates, checksum and response validation.
//!
//! Every frame is `[0xFF, b1, b2 .. b7, checksum]`. The checksum is the two's
//! complement of the byte sum over offsets 1 through 7. Outbound frames carry
//! the sensor address at offset 1 and the command at offset 2; responses echo
//! the command at offset 1.

use crate::constants::*;
use crate::error::FrameError;
use crate::types::{CommandKind, Frame};

/// Fixed outbound frame for `kind`
pub fn encode(kind: CommandKind) -> Frame {
    let bytes = match kind {
        CommandKind::MeasureConcentration => MEASURE_FRAME,
        CommandKind::EnableBaselineCorrection => BASELINE_ON_FRAME,
        CommandKind::DisableBaselineCorrection => BASELINE_OFF_FRAME,
    };
    Frame::from_bytes(bytes)
}

/// Two's-complement checksum over offsets `1..=len-2`.
///
/// The start byte and the trailing checksum slot are excluded, so the same
/// function serves full frames and frames whose last byte is still unset.
pub fn checksum(bytes: &[u8]) -> u8 {
    if bytes.len() < 2 {
        return 0;
    }
    let sum = bytes[1..bytes.len() - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Check length and checksum of a received byte sequence
pub fn validate(bytes: &[u8]) -> Result<Frame, FrameError> {
    let frame: [u8; FRAME_LEN] = bytes
        .try_into()
        .map_err(|_| FrameError::WrongLength { len: bytes.len() })?;

    let computed = checksum(&frame);
    let received = frame[FRAME_LEN - 1];
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(Frame::from_bytes(frame))
}

/// Concentration carried big-endian at offsets 2..=3 of a measurement reply
pub fn decode_concentration(frame: &Frame) -> i32 {
    let bytes = frame.as_bytes();
    u16::from_be_bytes([bytes[2], bytes[3]]) as i32
}
