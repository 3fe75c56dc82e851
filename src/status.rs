//! GUI status snapshot file.
//!
//! Written at 50 Hz as one line of `key:value` tokens. The file is replaced
//! via write-to-temp-then-rename so the GUI never reads a half-written line.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

use crsf_proto::signal_to_ticks;
use signal_core::{CHANNELS, SOURCES};

/// Where the GUI expects the snapshot.
pub const STATUS_PATH: &str = "/tmp/flight_status.txt";

/// One tick's worth of observable state.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Work time of the current tick, in milliseconds.
    pub latency_ms: f32,
    pub connected: bool,
    /// Final logical channels, pre-scaling.
    pub channels: [i16; CHANNELS],
    /// Raw sources after conditioning.
    pub tuned: [i16; SOURCES],
    /// Raw sources as sampled.
    pub raw: [i16; SOURCES],
}

pub struct StatusWriter {
    path: PathBuf,
    tmp: PathBuf,
}

impl StatusWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp: PathBuf::from(tmp),
        }
    }

    /// Render and atomically replace the snapshot file.
    pub fn write(&self, snapshot: &StatusSnapshot) -> io::Result<()> {
        let line = render(snapshot);
        fs::write(&self.tmp, line)?;
        fs::rename(&self.tmp, &self.path)
    }
}

fn render(snapshot: &StatusSnapshot) -> String {
    let mut line = String::with_capacity(640);
    let _ = write!(
        line,
        "latency_ms:{:.2} rate_hz:1000.0 connected:{}",
        snapshot.latency_ms, snapshot.connected as u8
    );
    for (i, &v) in snapshot.channels.iter().enumerate() {
        let _ = write!(line, " ch{}:{}", i + 1, signal_to_ticks(v));
    }
    for (i, &v) in snapshot.tuned.iter().enumerate() {
        let _ = write!(line, " tunedid{i}:{v}");
    }
    for (i, &v) in snapshot.raw.iter().enumerate() {
        let _ = write!(line, " rawid{i}:{v}");
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            latency_ms: 0.13,
            connected: true,
            channels: [0; CHANNELS],
            tuned: [0; SOURCES],
            raw: [0; SOURCES],
        }
    }

    #[test]
    fn test_render_shape() {
        let mut snap = snapshot();
        snap.channels[0] = i16::MAX;
        snap.raw[2] = -12345;
        let line = render(&snap);

        assert!(line.starts_with("latency_ms:0.13 rate_hz:1000.0 connected:1"));
        assert!(line.contains(" ch1:1811"));
        assert!(line.contains(" ch2:992"));
        assert!(line.contains(" ch16:992"));
        assert!(line.contains(" tunedid0:0"));
        assert!(line.contains(" tunedid22:0"));
        assert!(line.contains(" rawid2:-12345"));
        assert!(line.ends_with('\n'));
        // One line, exactly.
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_render_disconnected() {
        let mut snap = snapshot();
        snap.connected = false;
        assert!(render(&snap).contains(" connected:0 "));
    }

    #[test]
    fn test_writer_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight_status.txt");
        let writer = StatusWriter::new(&path);

        writer.write(&snapshot()).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        let mut snap = snapshot();
        snap.connected = false;
        writer.write(&snap).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert!(first.contains("connected:1"));
        assert!(second.contains("connected:0"));
    }
}
