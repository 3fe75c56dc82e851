//! Per-axis signal conditioning.
//!
//! One sample flows through a fixed pipeline: deadzone, response curve,
//! sensitivity, the cinematic follower, clamp, low-pass, requantise. The
//! order is load-bearing: the deadzone rescale feeds the curve a clean
//! [0, 1] magnitude, and the follower must see the fully shaped setpoint so
//! it smooths the trajectory rather than the raw sample.

/// The fixed control-loop period, in seconds.
pub const TICK_DT: f32 = 0.001;

/// Velocity hysteresis of the follower's acceleration limiter.
const VEL_EPSILON: f32 = 1e-4;

/// Response curve selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveKind {
    /// Identity.
    #[default]
    Linear,
    /// Cubic expo; negative expo flattens via a fractional power.
    Standard,
    /// Raised-cosine S-curve blend.
    Dynamic,
    /// True exponential.
    Extreme,
}

impl CurveKind {
    /// Map the wire selector (0..=3) to a curve. Other values are not a curve.
    #[must_use]
    pub fn from_selector(v: u8) -> Option<Self> {
        match v {
            0 => Some(CurveKind::Linear),
            1 => Some(CurveKind::Standard),
            2 => Some(CurveKind::Dynamic),
            3 => Some(CurveKind::Extreme),
            _ => None,
        }
    }

    /// The wire selector for this curve.
    #[must_use]
    pub fn selector(self) -> u8 {
        match self {
            CurveKind::Linear => 0,
            CurveKind::Standard => 1,
            CurveKind::Dynamic => 2,
            CurveKind::Extreme => 3,
        }
    }
}

/// One axis' tuning parameters, snapshotted once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTuning {
    /// Symmetric central cut, in [0, 1).
    pub deadzone: f32,
    /// Post-curve gain.
    pub sensitivity: f32,
    /// Low-pass coefficient in [0, 1]; 0 disables the filter.
    pub smoothing: f32,
    pub curve: CurveKind,
    /// Curve strength, in [-10, 10].
    pub expo: f32,
    pub cine_on: bool,
    /// Follower top speed, 0..=10.
    pub cine_speed: f32,
    /// Follower acceleration, 0..=10.
    pub cine_accel: f32,
}

impl Default for AxisTuning {
    fn default() -> Self {
        Self {
            deadzone: 0.05,
            sensitivity: 1.0,
            smoothing: 0.2,
            curve: CurveKind::Linear,
            expo: 0.0,
            cine_on: false,
            cine_speed: 5.0,
            cine_accel: 5.0,
        }
    }
}

/// Persistent filter memory for one axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisState {
    /// Previous filtered sample, in raw units.
    pub prev: i16,
    /// Follower position, normalised.
    pub cine_pos: f32,
    /// Follower velocity, normalised units per second.
    pub cine_vel: f32,
}

/// Condition one raw sample.
///
/// `dt` is the loop period in seconds; the orchestrator runs at a fixed
/// 1 kHz and passes [`TICK_DT`].
pub fn condition(raw: i16, dt: f32, tuning: &AxisTuning, state: &mut AxisState) -> i16 {
    let x = raw as f32 / 32767.0;

    let x = apply_deadzone(x, tuning.deadzone);
    let x = apply_curve(x, tuning.curve, tuning.expo);
    let x = x * tuning.sensitivity;

    let x = if tuning.cine_on {
        follow(x, dt, tuning.cine_speed, tuning.cine_accel, state)
    } else {
        state.cine_pos = x;
        state.cine_vel = 0.0;
        x
    };

    let x = x.clamp(-1.0, 1.0);

    let alpha = tuning.smoothing;
    let y = (1.0 - alpha) * x + alpha * (state.prev as f32 / 32767.0);

    let out = (y * 32767.0).round() as i16;
    state.prev = out;
    out
}

/// Symmetric deadzone with rescale, so output ramps from zero at the edge of
/// the zone instead of jumping.
fn apply_deadzone(x: f32, deadzone: f32) -> f32 {
    if x.abs() < deadzone {
        0.0
    } else {
        x.signum() * (x.abs() - deadzone) / (1.0 - deadzone)
    }
}

/// Apply the response curve to the magnitude, then restore the sign.
fn apply_curve(x: f32, curve: CurveKind, expo: f32) -> f32 {
    let a = x.abs();
    let shaped = match curve {
        CurveKind::Linear => a,
        CurveKind::Standard => {
            let k = (expo / 10.0).clamp(-1.0, 1.0);
            if k >= 0.0 {
                k * a * a * a + (1.0 - k) * a
            } else {
                a.powf(1.0 / (1.0 - k))
            }
        }
        CurveKind::Dynamic => {
            let k = (expo / 10.0).clamp(0.0, 1.0);
            (1.0 - k) * a + k * (0.5 - 0.5 * (core::f32::consts::PI * a).cos())
        }
        CurveKind::Extreme => {
            let k = (expo / 10.0).clamp(-5.0, 5.0);
            if k.abs() < 0.01 {
                a
            } else {
                ((k * a).exp() - 1.0) / (k.exp() - 1.0)
            }
        }
    };
    if x < 0.0 {
        -shaped
    } else {
        shaped
    }
}

/// Second-order follower with predictive braking.
///
/// The follower chases the shaped setpoint with bounded acceleration. Its
/// speed is capped at the value from which constant deceleration still stops
/// exactly on target (`v = sqrt(2 a d)`), so approaches end without
/// overshoot at moderate settings, and a hard snap kills the residual creep
/// near the target.
fn follow(target: f32, dt: f32, speed: f32, accel: f32, state: &mut AxisState) -> f32 {
    let d = target - state.cine_pos;
    let dist = d.abs();

    let a = accel * 0.5;
    let v_safe = (2.0 * a * dist).sqrt();
    let damping = 1.0 + (10.0 - speed) * 0.5;
    let direction = if d > 0.0 {
        1.0
    } else if d < 0.0 {
        -1.0
    } else {
        0.0
    };
    let v_target = v_safe.min(1.0) / damping * direction;

    let dv = v_target - state.cine_vel;
    if dv.abs() > VEL_EPSILON {
        let step = (a * dt).min(dv.abs());
        state.cine_vel += if dv > 0.0 { step } else { -step };
    }

    state.cine_pos += state.cine_vel * dt;

    if dist < 0.001 && state.cine_vel.abs() < 0.01 {
        state.cine_pos = target;
        state.cine_vel = 0.0;
    }

    state.cine_pos
}
