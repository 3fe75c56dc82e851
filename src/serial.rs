//! The serial link to the RF module.
//!
//! The control thread owns the write half and pushes one 26-byte frame per
//! tick; a drain thread owns the read half and feeds every inbound byte to
//! the frame assembler. The two halves are independent clones of the same
//! port, so no interlock is needed beyond the file descriptor itself.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crsf_proto::{FrameAssembler, RC_FRAME_LEN};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::store::TelemetryStore;

/// Devices tried in order when no explicit path is given.
pub const PORT_CANDIDATES: [&str; 2] = ["/dev/ttyUSB0", "/dev/ttyACM0"];

/// Read timeout of the drain thread; bounds shutdown latency.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Write timeout of the control thread. A frame that cannot leave within
/// this window is stale anyway; the next tick supersedes it.
const WRITE_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no serial device available (tried {})", PORT_CANDIDATES.join(", "))]
    NoDevice,
    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),
}

/// The write half of the RF module link.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the first available device at the given baud rate, 8-N-1, no
    /// flow control.
    ///
    /// This constructor is the only place the non-portable custom-baud
    /// setting lives; CRSF's 420000 baud is not a POSIX-standard rate and
    /// goes through the builder unchecked.
    pub fn open(baud: u32, override_path: Option<&str>) -> Result<Self, LinkError> {
        let candidates = override_path
            .into_iter()
            .chain(PORT_CANDIDATES.iter().copied());
        for path in candidates {
            match serialport::new(path, baud)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(WRITE_TIMEOUT)
                .open()
            {
                Ok(port) => {
                    info!("opened {path} at {baud} baud");
                    return Ok(Self { port });
                }
                Err(e) => debug!("could not open {path}: {e}"),
            }
        }

        Err(LinkError::NoDevice)
    }

    /// Clone the read half for the drain thread.
    pub fn reader(&self) -> Result<Box<dyn SerialPort>, LinkError> {
        let mut reader = self.port.try_clone()?;
        reader.set_timeout(READ_TIMEOUT)?;
        Ok(reader)
    }

    /// Best-effort frame write.
    ///
    /// Short and timed-out writes are not retried within the tick; the
    /// next frame supersedes whatever was lost.
    pub fn write_frame(&mut self, frame: &[u8; RC_FRAME_LEN]) {
        use std::io::Write;
        match self.port.write(frame) {
            Ok(n) if n < frame.len() => trace!("short serial write: {n}/{}", frame.len()),
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => debug!("serial write failed: {e}"),
        }
    }
}

/// Spawn the drain thread: read whatever bytes are available, assemble
/// frames, merge decoded telemetry into the store.
pub fn spawn_drain(
    reader: Box<dyn SerialPort>,
    store: Arc<TelemetryStore>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("serial-drain".into())
        .spawn(move || drain_loop(reader, &store, &running))
}

fn drain_loop(mut reader: Box<dyn SerialPort>, store: &TelemetryStore, running: &AtomicBool) {
    let mut assembler = FrameAssembler::new();
    let mut buf = [0u8; 256];

    while running.load(Ordering::Relaxed) {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                debug!("serial read error: {e}");
                continue;
            }
        };

        for &byte in &buf[..n] {
            match assembler.push_byte(byte) {
                Some(Ok(telemetry)) => {
                    trace!(?telemetry, "telemetry frame");
                    store.apply(telemetry);
                }
                Some(Err(e)) => {
                    trace!("dropped inbound frame: {e:?}");
                    store.note_bad_frame();
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crsf_proto::Telemetry;

    // The drain logic itself is a thin pump around FrameAssembler; feed the
    // same byte stream the assembler tests use through a store and check
    // the bookkeeping lines up.
    #[test]
    fn test_stream_bookkeeping() {
        let store = TelemetryStore::new();
        let mut assembler = FrameAssembler::new();

        let mut stream = Vec::new();
        stream.extend_from_slice(&[0x00, 0x13]); // line noise
        stream.extend_from_slice(&[0xC8, 0x04, 0x07, 0xFF, 0x6A, 0x34]); // vario
        let mut corrupt = [0xC8u8, 0x04, 0x0B, 0x03, 0x6B, 0x11];
        corrupt[4] ^= 0xFF;
        stream.extend_from_slice(&corrupt); // fuel frame with a flipped byte
        stream.extend_from_slice(&[0xC8, 0x04, 0x0B, 0x03, 0x6B, 0x11]); // fuel

        for byte in stream {
            match assembler.push_byte(byte) {
                Some(Ok(t)) => store.apply(t),
                Some(Err(_)) => store.note_bad_frame(),
                None => {}
            }
        }

        let snap = store.snapshot();
        assert_eq!(snap.good_frames, 2);
        assert_eq!(snap.bad_frames, 1);
        assert_eq!(snap.vario, Some(Telemetry::Vario { vertical_speed: -150 }));
        assert_eq!(snap.fuel, Some(Telemetry::Fuel { level: 875 }));
    }
}
