//! Inbound telemetry frame payloads.
//!
//! Each variant mirrors one CRSF frame type sent by the RF module back to
//! the handset. All multi-byte integer fields are big-endian on the wire.

use crate::frame::DecodeError;

/// Maximum stored length of a flight-mode string.
pub const FLIGHT_MODE_MAX: usize = 60;

/// One decoded telemetry frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    /// GPS fix (type 0x02).
    Gps {
        /// Latitude in degrees * 1e7.
        latitude: i32,
        /// Longitude in degrees * 1e7.
        longitude: i32,
        /// Ground speed in 0.1 km/h.
        groundspeed: u16,
        /// Heading in 0.01 degrees.
        heading: u16,
        /// Altitude in metres with a 1000 m offset.
        altitude: u16,
        /// Number of satellites in the fix.
        satellites: u8,
        /// Horizontal dilution of precision, when the extended payload is present.
        hdop: Option<f32>,
    },
    /// Vertical speed (type 0x07), in cm/s.
    Vario { vertical_speed: i16 },
    /// Battery sensor (type 0x08).
    Battery {
        /// Voltage in 0.1 V.
        voltage: u16,
        /// Current in 0.1 A.
        current: u16,
        /// Capacity used in mAh (24-bit on the wire).
        capacity_used: u32,
        /// Remaining capacity percentage.
        remaining: u8,
    },
    /// RF link statistics (type 0x14).
    LinkStats {
        uplink_rssi_1: i8,
        uplink_rssi_2: i8,
        uplink_lq: u8,
        uplink_snr: i8,
        active_antenna: u8,
        rf_mode: u8,
        uplink_tx_power: u8,
        downlink_rssi: i8,
        downlink_lq: u8,
        downlink_snr: i8,
    },
    /// Attitude (type 0x1E), angles in 1/10000 rad.
    Attitude { pitch: i16, roll: i16, yaw: i16 },
    /// Flight mode string (type 0x21), NUL-terminated on the wire.
    FlightMode { mode: heapless::String<FLIGHT_MODE_MAX> },
    /// Airspeed (type 0x0A), in 0.1 km/h.
    Airspeed { speed: u16 },
    /// ESC telemetry (type 0x7E).
    Esc { rpm: u16, temperature: u8 },
    /// Fuel level (type 0x0B).
    Fuel { level: u16 },
    /// Device info (type 0x29).
    DeviceInfo {
        mcu_temperature: u8,
        load: u8,
        heartbeat: u8,
        armed: u8,
    },
}

impl Telemetry {
    /// Decode a telemetry payload by frame type.
    ///
    /// Returns [`DecodeError::UnknownType`] for types this handset does not
    /// consume, and [`DecodeError::ShortPayload`] when the payload is
    /// truncated below the type's minimum width.
    pub fn decode(frame_type: u8, payload: &[u8]) -> Result<Self, DecodeError> {
        match frame_type {
            crate::frame::TYPE_GPS => decode_gps(payload),
            crate::frame::TYPE_VARIO => Ok(Telemetry::Vario {
                vertical_speed: be_i16(payload, 0)?,
            }),
            crate::frame::TYPE_BATTERY => decode_battery(payload),
            crate::frame::TYPE_LINK_STATS => decode_link_stats(payload),
            crate::frame::TYPE_ATTITUDE => Ok(Telemetry::Attitude {
                pitch: be_i16(payload, 0)?,
                roll: be_i16(payload, 2)?,
                yaw: be_i16(payload, 4)?,
            }),
            crate::frame::TYPE_FLIGHT_MODE => decode_flight_mode(payload),
            crate::frame::TYPE_AIRSPEED => Ok(Telemetry::Airspeed {
                speed: be_u16(payload, 0)?,
            }),
            crate::frame::TYPE_ESC => decode_esc(payload),
            crate::frame::TYPE_FUEL => Ok(Telemetry::Fuel {
                level: be_u16(payload, 0)?,
            }),
            crate::frame::TYPE_DEVICE_INFO => decode_device_info(payload),
            _ => Err(DecodeError::UnknownType),
        }
    }
}

fn decode_gps(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.len() < 15 {
        return Err(DecodeError::ShortPayload);
    }
    // HDOP rides in an extended payload some receivers append.
    let hdop = if payload.len() >= 19 {
        Some(be_u32(payload, 15)? as f32 / 100.0)
    } else {
        None
    };
    Ok(Telemetry::Gps {
        latitude: be_i32(payload, 0)?,
        longitude: be_i32(payload, 4)?,
        groundspeed: be_u16(payload, 8)?,
        heading: be_u16(payload, 10)?,
        altitude: be_u16(payload, 12)?,
        satellites: payload[14],
        hdop,
    })
}

fn decode_battery(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.len() < 8 {
        return Err(DecodeError::ShortPayload);
    }
    let capacity_used =
        ((payload[4] as u32) << 16) | ((payload[5] as u32) << 8) | payload[6] as u32;
    Ok(Telemetry::Battery {
        voltage: be_u16(payload, 0)?,
        current: be_u16(payload, 2)?,
        capacity_used,
        remaining: payload[7],
    })
}

fn decode_link_stats(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.len() < 10 {
        return Err(DecodeError::ShortPayload);
    }
    Ok(Telemetry::LinkStats {
        uplink_rssi_1: payload[0] as i8,
        uplink_rssi_2: payload[1] as i8,
        uplink_lq: payload[2],
        uplink_snr: payload[3] as i8,
        active_antenna: payload[4],
        rf_mode: payload[5],
        uplink_tx_power: payload[6],
        downlink_rssi: payload[7] as i8,
        downlink_lq: payload[8],
        downlink_snr: payload[9] as i8,
    })
}

fn decode_flight_mode(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::ShortPayload);
    }
    // Text runs up to the NUL terminator (or the payload end if unterminated).
    let text_len = payload
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(payload.len());
    let mut mode = heapless::String::new();
    for &b in payload[..text_len].iter().take(FLIGHT_MODE_MAX) {
        let _ = mode.push(b as char);
    }
    Ok(Telemetry::FlightMode { mode })
}

fn decode_esc(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.len() < 2 {
        return Err(DecodeError::ShortPayload);
    }
    let temperature = if payload.len() >= 3 { payload[2] } else { 0 };
    Ok(Telemetry::Esc {
        rpm: be_u16(payload, 0)?,
        temperature,
    })
}

fn decode_device_info(payload: &[u8]) -> Result<Telemetry, DecodeError> {
    if payload.len() < 4 {
        return Err(DecodeError::ShortPayload);
    }
    Ok(Telemetry::DeviceInfo {
        mcu_temperature: payload[0],
        load: payload[1],
        heartbeat: payload[2],
        armed: payload[3],
    })
}

#[inline]
fn be_u16(payload: &[u8], at: usize) -> Result<u16, DecodeError> {
    let bytes: [u8; 2] = payload
        .get(at..at + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(DecodeError::ShortPayload)?;
    Ok(u16::from_be_bytes(bytes))
}

#[inline]
fn be_i16(payload: &[u8], at: usize) -> Result<i16, DecodeError> {
    be_u16(payload, at).map(|v| v as i16)
}

#[inline]
fn be_u32(payload: &[u8], at: usize) -> Result<u32, DecodeError> {
    let bytes: [u8; 4] = payload
        .get(at..at + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(DecodeError::ShortPayload)?;
    Ok(u32::from_be_bytes(bytes))
}

#[inline]
fn be_i32(payload: &[u8], at: usize) -> Result<i32, DecodeError> {
    be_u32(payload, at).map(|v| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame;

    #[test]
    fn test_decode_link_stats() {
        let payload = [0xF0, 0xEE, 0x64, 0x05, 0x01, 0x02, 0x0A, 0xE0, 0x5A, 0x03];
        let t = Telemetry::decode(frame::TYPE_LINK_STATS, &payload).unwrap();
        assert_eq!(
            t,
            Telemetry::LinkStats {
                uplink_rssi_1: -16,
                uplink_rssi_2: -18,
                uplink_lq: 100,
                uplink_snr: 5,
                active_antenna: 1,
                rf_mode: 2,
                uplink_tx_power: 10,
                downlink_rssi: -32,
                downlink_lq: 90,
                downlink_snr: 3,
            }
        );
    }

    #[test]
    fn test_decode_gps_without_hdop() {
        let mut payload = [0u8; 15];
        payload[..4].copy_from_slice(&471234567i32.to_be_bytes());
        payload[4..8].copy_from_slice(&85553311i32.to_be_bytes());
        payload[8..10].copy_from_slice(&123u16.to_be_bytes());
        payload[10..12].copy_from_slice(&2705u16.to_be_bytes());
        payload[12..14].copy_from_slice(&1042u16.to_be_bytes());
        payload[14] = 11;

        let t = Telemetry::decode(frame::TYPE_GPS, &payload).unwrap();
        assert_eq!(
            t,
            Telemetry::Gps {
                latitude: 471234567,
                longitude: 85553311,
                groundspeed: 123,
                heading: 2705,
                altitude: 1042,
                satellites: 11,
                hdop: None,
            }
        );
    }

    #[test]
    fn test_decode_gps_with_hdop() {
        let mut payload = [0u8; 19];
        payload[14] = 7;
        payload[15..19].copy_from_slice(&150u32.to_be_bytes());
        match Telemetry::decode(frame::TYPE_GPS, &payload).unwrap() {
            Telemetry::Gps { satellites, hdop, .. } => {
                assert_eq!(satellites, 7);
                assert_eq!(hdop, Some(1.5));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_battery() {
        let payload = [0x00, 0x42, 0x00, 0x15, 0x00, 0x01, 0x02, 55];
        let t = Telemetry::decode(frame::TYPE_BATTERY, &payload).unwrap();
        assert_eq!(
            t,
            Telemetry::Battery {
                voltage: 0x0042,
                current: 0x0015,
                capacity_used: 0x000102,
                remaining: 55,
            }
        );
    }

    #[test]
    fn test_decode_attitude() {
        let payload = [0x03, 0xE8, 0xF8, 0x30, 0x3A, 0x98];
        let t = Telemetry::decode(frame::TYPE_ATTITUDE, &payload).unwrap();
        assert_eq!(
            t,
            Telemetry::Attitude {
                pitch: 1000,
                roll: -2000,
                yaw: 15000,
            }
        );
    }

    #[test]
    fn test_decode_flight_mode() {
        let t = Telemetry::decode(frame::TYPE_FLIGHT_MODE, b"ACRO\0").unwrap();
        match t {
            Telemetry::FlightMode { mode } => assert_eq!(mode.as_str(), "ACRO"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_flight_mode_unterminated() {
        let t = Telemetry::decode(frame::TYPE_FLIGHT_MODE, b"WAIT").unwrap();
        match t {
            Telemetry::FlightMode { mode } => assert_eq!(mode.as_str(), "WAIT"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_vario_esc_fuel_device_info() {
        assert_eq!(
            Telemetry::decode(frame::TYPE_VARIO, &(-150i16).to_be_bytes()).unwrap(),
            Telemetry::Vario { vertical_speed: -150 }
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_ESC, &[0x2E, 0xE0, 61]).unwrap(),
            Telemetry::Esc { rpm: 12000, temperature: 61 }
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_FUEL, &875u16.to_be_bytes()).unwrap(),
            Telemetry::Fuel { level: 875 }
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_DEVICE_INFO, &[48, 37, 1, 1]).unwrap(),
            Telemetry::DeviceInfo {
                mcu_temperature: 48,
                load: 37,
                heartbeat: 1,
                armed: 1,
            }
        );
    }

    #[test]
    fn test_decode_esc_without_temperature() {
        assert_eq!(
            Telemetry::decode(frame::TYPE_ESC, &[0x2E, 0xE0]).unwrap(),
            Telemetry::Esc { rpm: 12000, temperature: 0 }
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(
            Telemetry::decode(0x55, &[0, 1, 2]),
            Err(DecodeError::UnknownType)
        );
    }

    #[test]
    fn test_decode_short_payloads() {
        assert_eq!(
            Telemetry::decode(frame::TYPE_LINK_STATS, &[0; 9]),
            Err(DecodeError::ShortPayload)
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_GPS, &[0; 14]),
            Err(DecodeError::ShortPayload)
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_BATTERY, &[0; 7]),
            Err(DecodeError::ShortPayload)
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_VARIO, &[0]),
            Err(DecodeError::ShortPayload)
        );
        assert_eq!(
            Telemetry::decode(frame::TYPE_FLIGHT_MODE, &[]),
            Err(DecodeError::ShortPayload)
        );
    }
}
