//! CRSF wire protocol: framing, channel packing and telemetry decoding.
//!
//! This crate provides the chip-agnostic wire layer for a CRSF handset.
//! It is designed to be driven by any byte transport and is fully testable
//! on host.
//!
//! # Overview
//!
//! - [`crc`]: CRC-8/DVB-S2 over the `crc` crate's compile-time table
//! - [`channels`]: i16 signal to 11-bit tick scaling and the 22-byte packing
//! - [`frame`]: the 26-byte RC channels frame encoder, the inbound frame
//!   decoder and the resynchronising [`FrameAssembler`]
//! - [`telemetry`]: one [`Telemetry`] variant per inbound frame type
//!
//! # Example
//!
//! ```
//! use crsf_proto::{encode_rc_frame, FrameAssembler};
//!
//! // Outbound: 16 logical channel values, one frame per tick.
//! let frame = encode_rc_frame(&[0i16; 16]);
//! assert_eq!(frame.len(), 26);
//!
//! // Inbound: feed serial bytes, complete frames fall out.
//! let mut assembler = FrameAssembler::new();
//! for byte in frame {
//!     // The handset's own frame type is not telemetry, so nothing decodes
//!     // here; real input comes from the RF module.
//!     let _ = assembler.push_byte(byte);
//! }
//! ```
//!
//! # UART configuration
//!
//! CRSF runs at 420000 baud, 8N1, no flow control.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod channels;
pub mod crc;
pub mod frame;
pub mod telemetry;

pub use channels::{
    pack_channels, signal_to_ticks, unpack_channels, CHANNELS, PACKED_LEN, TICKS_MAX, TICKS_MID,
    TICKS_MIN,
};
pub use crc::crc8;
pub use frame::{
    decode_frame, encode_rc_frame, DecodeError, FrameAssembler, ADDR_HANDSET, MAX_FRAME_LEN,
    RC_FRAME_LEN, SYNC_BYTE,
};
pub use telemetry::Telemetry;

/// CRSF baud rate for ExpressLRS-style modules.
pub const CRSF_BAUDRATE: u32 = 420_000;
