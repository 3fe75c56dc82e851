//! Live tuning state shared between the control loop and the control plane.
//!
//! Each parameter lives in its own atomic cell (f32 values bit-cast into
//! `AtomicU32`), written by the control plane and snapshotted once per tick
//! by the control loop. Relaxed ordering is sufficient: the conditioning
//! pipeline is continuous in its inputs and no cross-field consistency is
//! required, only tear-free individual fields.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::tuning::{AxisTuning, CurveKind};

/// The shared tuning cells. Setters clamp to each parameter's legal range,
/// so a snapshot always satisfies the pipeline's invariants.
#[derive(Debug)]
pub struct SharedTuning {
    left_deadzone: AtomicU32,
    right_deadzone: AtomicU32,
    sensitivity: AtomicU32,
    smoothing: AtomicU32,
    expo: AtomicU32,
    curve: AtomicU8,
    cine_on: AtomicBool,
    cine_speed: AtomicU32,
    cine_accel: AtomicU32,
}

impl Default for SharedTuning {
    fn default() -> Self {
        let d = AxisTuning::default();
        Self {
            left_deadzone: cell(d.deadzone),
            right_deadzone: cell(d.deadzone),
            sensitivity: cell(d.sensitivity),
            smoothing: cell(d.smoothing),
            expo: cell(d.expo),
            curve: AtomicU8::new(d.curve.selector()),
            cine_on: AtomicBool::new(d.cine_on),
            cine_speed: cell(d.cine_speed),
            cine_accel: cell(d.cine_accel),
        }
    }
}

impl SharedTuning {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_left_deadzone(&self, v: f32) {
        store(&self.left_deadzone, v.clamp(0.0, 0.99));
    }

    pub fn set_right_deadzone(&self, v: f32) {
        store(&self.right_deadzone, v.clamp(0.0, 0.99));
    }

    pub fn set_sensitivity(&self, v: f32) {
        store(&self.sensitivity, v.clamp(0.01, 100.0));
    }

    pub fn set_smoothing(&self, v: f32) {
        store(&self.smoothing, v.clamp(0.0, 1.0));
    }

    pub fn set_expo(&self, v: f32) {
        store(&self.expo, v.clamp(-10.0, 10.0));
    }

    /// Select a curve by its wire selector. Values outside 0..=3 are ignored.
    pub fn set_curve(&self, selector: u8) {
        if let Some(curve) = CurveKind::from_selector(selector) {
            self.curve.store(curve.selector(), Ordering::Relaxed);
        }
    }

    pub fn set_cine_on(&self, on: bool) {
        self.cine_on.store(on, Ordering::Relaxed);
    }

    pub fn set_cine_speed(&self, v: f32) {
        store(&self.cine_speed, v.clamp(0.0, 10.0));
    }

    pub fn set_cine_accel(&self, v: f32) {
        store(&self.cine_accel, v.clamp(0.0, 10.0));
    }

    #[must_use]
    pub fn left_deadzone(&self) -> f32 {
        load(&self.left_deadzone)
    }

    #[must_use]
    pub fn right_deadzone(&self) -> f32 {
        load(&self.right_deadzone)
    }

    /// Materialise one axis' tuning view with the given deadzone.
    #[must_use]
    pub fn axis_tuning(&self, deadzone: f32) -> AxisTuning {
        AxisTuning {
            deadzone,
            sensitivity: load(&self.sensitivity),
            smoothing: load(&self.smoothing),
            curve: CurveKind::from_selector(self.curve.load(Ordering::Relaxed))
                .unwrap_or_default(),
            expo: load(&self.expo),
            cine_on: self.cine_on.load(Ordering::Relaxed),
            cine_speed: load(&self.cine_speed),
            cine_accel: load(&self.cine_accel),
        }
    }
}

fn cell(v: f32) -> AtomicU32 {
    AtomicU32::new(v.to_bits())
}

#[inline]
fn store(cell: &AtomicU32, v: f32) {
    cell.store(v.to_bits(), Ordering::Relaxed);
}

#[inline]
fn load(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}
