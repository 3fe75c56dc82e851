//! CRSF frame envelope: encoding the outbound RC channels frame and
//! reassembling inbound telemetry frames from a byte stream.
//!
//! Every frame shares the same envelope:
//!
//! ```text
//! [sync/addr, len, type, payload.., crc]
//! ```
//!
//! `len` counts the bytes after itself (type + payload + crc), so a complete
//! frame is `len + 2` bytes. The CRC-8 runs over type and payload.

use crate::channels::{pack_channels, signal_to_ticks, CHANNELS, PACKED_LEN};
use crate::crc::crc8;
use crate::telemetry::Telemetry;

/// Handset (radio transmitter) address byte.
pub const ADDR_HANDSET: u8 = 0xEE;

/// Broadcast sync byte used by flight controllers and receivers.
pub const SYNC_BYTE: u8 = 0xC8;

/// Total size of the outbound RC channels frame.
pub const RC_FRAME_LEN: usize = 26;

/// Largest inbound frame the assembler accepts.
pub const MAX_FRAME_LEN: usize = 64;

pub const TYPE_GPS: u8 = 0x02;
pub const TYPE_VARIO: u8 = 0x07;
pub const TYPE_BATTERY: u8 = 0x08;
pub const TYPE_AIRSPEED: u8 = 0x0A;
pub const TYPE_FUEL: u8 = 0x0B;
pub const TYPE_LINK_STATS: u8 = 0x14;
pub const TYPE_RC_CHANNELS: u8 = 0x16;
pub const TYPE_ATTITUDE: u8 = 0x1E;
pub const TYPE_FLIGHT_MODE: u8 = 0x21;
pub const TYPE_DEVICE_INFO: u8 = 0x29;
pub const TYPE_ESC: u8 = 0x7E;

/// Error type for inbound frame decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame shorter than the envelope minimum, or not matching its length byte.
    BadLength,
    /// CRC mismatch.
    BadCrc,
    /// Frame type this handset does not consume.
    UnknownType,
    /// Payload truncated below the type's minimum width.
    ShortPayload,
}

/// Encode 16 logical channel values into a complete RC channels frame.
///
/// Scales each value onto the 11-bit tick range, packs the payload and
/// closes the envelope with the CRC over type + payload.
#[must_use]
pub fn encode_rc_frame(logical: &[i16; CHANNELS]) -> [u8; RC_FRAME_LEN] {
    let mut ticks = [0u16; CHANNELS];
    for (t, &v) in ticks.iter_mut().zip(logical.iter()) {
        *t = signal_to_ticks(v);
    }

    let mut frame = [0u8; RC_FRAME_LEN];
    frame[0] = ADDR_HANDSET;
    frame[1] = (1 + PACKED_LEN + 1) as u8; // type + payload + crc
    frame[2] = TYPE_RC_CHANNELS;
    frame[3..25].copy_from_slice(&pack_channels(&ticks));
    frame[25] = crc8(&frame[2..25]);
    frame
}

/// Decode one complete inbound frame (sync byte through CRC).
pub fn decode_frame(frame: &[u8]) -> Result<Telemetry, DecodeError> {
    if frame.len() < 4 {
        return Err(DecodeError::BadLength);
    }
    let len = frame[1] as usize;
    if frame.len() != len + 2 {
        return Err(DecodeError::BadLength);
    }

    // CRC covers type + payload, i.e. everything between len and the CRC byte.
    let crc_end = 2 + len - 1;
    if crc8(&frame[2..crc_end]) != frame[crc_end] {
        return Err(DecodeError::BadCrc);
    }

    Telemetry::decode(frame[2], &frame[3..crc_end])
}

/// Resynchronising byte-at-a-time frame assembler.
///
/// Feed it the raw serial stream; it discards noise until a legal sync byte
/// arrives, collects `len + 2` bytes, verifies the CRC and hands the decoded
/// frame back. Integrity failures drop the buffer and bump a counter, then
/// hunting for the next sync byte resumes with the following byte.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: heapless::Vec<u8, MAX_FRAME_LEN>,
    bad_frames: u32,
}

impl FrameAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames dropped for integrity reasons since creation.
    #[inline]
    #[must_use]
    pub fn bad_frames(&self) -> u32 {
        self.bad_frames
    }

    /// Push one byte from the stream.
    ///
    /// Returns `Some` when the byte completes a frame: `Ok` with the decoded
    /// telemetry, or `Err` describing why the frame was dropped. `None`
    /// means the assembler needs more bytes (or discarded a non-sync byte).
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<Telemetry, DecodeError>> {
        if self.buf.is_empty() {
            if byte == ADDR_HANDSET || byte == SYNC_BYTE {
                // Capacity is > 0, the push cannot fail on an empty buffer.
                let _ = self.buf.push(byte);
            }
            return None;
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.bad_frames += 1;
            return Some(Err(DecodeError::BadLength));
        }

        let expected = self.buf[1] as usize + 2;
        if expected > MAX_FRAME_LEN {
            self.buf.clear();
            self.bad_frames += 1;
            return Some(Err(DecodeError::BadLength));
        }
        if self.buf.len() < expected {
            return None;
        }

        let result = decode_frame(&self.buf);
        self.buf.clear();
        if result.is_err() {
            self.bad_frames += 1;
        }
        Some(result)
    }
}
