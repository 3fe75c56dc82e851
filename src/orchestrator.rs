//! The 1 kHz control loop.
//!
//! Each tick: service pad events, sample the raw sources, condition the six
//! analog axes, project onto the logical channels under the mapping lock,
//! run the mixer, encode and transmit the frame, and every 20 ms drop a
//! status snapshot for the GUI. The loop then sleeps out the remainder of
//! the millisecond; it never busy-spins.
//!
//! Nothing on this path blocks on user input and nothing on it panics:
//! failed writes are superseded next tick and a missing pad transmits the
//! neutral floor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crsf_proto::encode_rc_frame;
use signal_core::{condition, AxisState, InputMapper, Mixer, SharedTuning, CHANNELS, SOURCES, TICK_DT};
use tracing::{debug, info};

use crate::pad::PadSource;
use crate::serial::SerialLink;
use crate::status::{StatusSnapshot, StatusWriter};

/// Loop period.
pub const TICK: Duration = Duration::from_millis(1);

/// Status snapshot cadence.
const STATUS_PERIOD: Duration = Duration::from_millis(20);

/// Fixed deadzone for the trigger axes; the stick deadzones are live-tuned,
/// the triggers only need debounce against resting noise.
const TRIGGER_DEADZONE: f32 = 0.05;

/// Number of conditioned analog axes.
const ANALOG_AXES: usize = 6;

pub struct Orchestrator {
    pad: PadSource,
    link: SerialLink,
    tuning: Arc<SharedTuning>,
    mapper: Arc<Mutex<InputMapper>>,
    mixer: Mixer,
    status: StatusWriter,
    running: Arc<AtomicBool>,
    axis_states: [AxisState; ANALOG_AXES],
}

impl Orchestrator {
    pub fn new(
        pad: PadSource,
        link: SerialLink,
        tuning: Arc<SharedTuning>,
        mapper: Arc<Mutex<InputMapper>>,
        status: StatusWriter,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pad,
            link,
            tuning,
            mapper,
            mixer: Mixer::new(),
            status,
            running,
            axis_states: [AxisState::default(); ANALOG_AXES],
        }
    }

    /// Run until the shutdown flag flips. Exits after the current tick.
    pub fn run(&mut self) {
        info!("control loop running at 1 kHz");

        let mut raw = [i16::MIN; SOURCES];
        let mut logical = [0i16; CHANNELS];
        let mut last_status = Instant::now();

        while self.running.load(Ordering::Relaxed) {
            let tick_start = Instant::now();

            self.pad.poll();
            self.pad.sample(&mut raw);

            let mut tuned = raw;
            self.condition_axes(&raw, &mut tuned);

            {
                let mapper = match self.mapper.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                mapper.update(&tuned, &mut logical);
            }
            self.mixer.process(&mut logical);

            let frame = encode_rc_frame(&logical);
            self.link.write_frame(&frame);

            if last_status.elapsed() >= STATUS_PERIOD {
                last_status = Instant::now();
                let snapshot = StatusSnapshot {
                    latency_ms: tick_start.elapsed().as_secs_f32() * 1000.0,
                    connected: self.pad.connected(),
                    channels: logical,
                    tuned,
                    raw,
                };
                if let Err(e) = self.status.write(&snapshot) {
                    debug!("status snapshot write failed: {e}");
                }
            }

            if let Some(remaining) = TICK.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        info!("control loop stopped");
    }

    /// Condition the analog axes in place: left-stick deadzone for 0..=1,
    /// right-stick for 2..=3, the fixed trigger deadzone for 4..=5.
    fn condition_axes(&mut self, raw: &[i16; SOURCES], tuned: &mut [i16; SOURCES]) {
        let left = self.tuning.axis_tuning(self.tuning.left_deadzone());
        let right = self.tuning.axis_tuning(self.tuning.right_deadzone());
        let trigger = self.tuning.axis_tuning(TRIGGER_DEADZONE);

        for (axis, state) in self.axis_states.iter_mut().enumerate() {
            let params = match axis {
                0 | 1 => &left,
                2 | 3 => &right,
                _ => &trigger,
            };
            tuned[axis] = condition(raw[axis], TICK_DT, params, state);
        }
    }
}
