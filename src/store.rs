//! Latest-value telemetry storage.
//!
//! The serial drain thread is the only writer; readers take a cloned
//! snapshot. One mutex around the whole snapshot is enough at the inbound
//! frame rates involved.

use std::sync::Mutex;

use crsf_proto::Telemetry;

/// The merged view of everything the RF module has reported, newest value
/// per frame type.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub link_stats: Option<Telemetry>,
    pub gps: Option<Telemetry>,
    pub battery: Option<Telemetry>,
    pub vario: Option<Telemetry>,
    pub attitude: Option<Telemetry>,
    pub flight_mode: Option<Telemetry>,
    pub airspeed: Option<Telemetry>,
    pub esc: Option<Telemetry>,
    pub fuel: Option<Telemetry>,
    pub device_info: Option<Telemetry>,
    /// Frames decoded successfully.
    pub good_frames: u64,
    /// Frames dropped for integrity reasons.
    pub bad_frames: u64,
}

#[derive(Debug, Default)]
pub struct TelemetryStore {
    inner: Mutex<TelemetrySnapshot>,
}

impl TelemetryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one decoded frame into the snapshot.
    pub fn apply(&self, telemetry: Telemetry) {
        let mut inner = lock(&self.inner);
        inner.good_frames += 1;
        let slot = match &telemetry {
            Telemetry::LinkStats { .. } => &mut inner.link_stats,
            Telemetry::Gps { .. } => &mut inner.gps,
            Telemetry::Battery { .. } => &mut inner.battery,
            Telemetry::Vario { .. } => &mut inner.vario,
            Telemetry::Attitude { .. } => &mut inner.attitude,
            Telemetry::FlightMode { .. } => &mut inner.flight_mode,
            Telemetry::Airspeed { .. } => &mut inner.airspeed,
            Telemetry::Esc { .. } => &mut inner.esc,
            Telemetry::Fuel { .. } => &mut inner.fuel,
            Telemetry::DeviceInfo { .. } => &mut inner.device_info,
        };
        *slot = Some(telemetry);
    }

    /// Record a frame dropped by the assembler.
    pub fn note_bad_frame(&self) {
        lock(&self.inner).bad_frames += 1;
    }

    #[must_use]
    pub fn snapshot(&self) -> TelemetrySnapshot {
        lock(&self.inner).clone()
    }
}

fn lock(inner: &Mutex<TelemetrySnapshot>) -> std::sync::MutexGuard<'_, TelemetrySnapshot> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
