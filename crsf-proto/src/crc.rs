//! CRC-8 checksum for CRSF frames.
//!
//! CRSF uses CRC-8/DVB-S2: polynomial 0xD5, initial value 0, no reflection,
//! no final XOR. The `crc` crate expands this to a 256-entry lookup table at
//! compile time, so the per-frame cost is one table walk.

use crc::{Crc, CRC_8_DVB_S2};

/// CRC-8/DVB-S2 calculator with a 256-entry lookup table.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_DVB_S2);

/// Calculate the CRC-8 checksum of a byte slice.
///
/// The same function is used when building outbound frames and when
/// verifying inbound ones.
#[inline]
#[must_use]
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}
