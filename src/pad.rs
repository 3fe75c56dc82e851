//! Gamepad sampling via gilrs.
//!
//! The pad is polled once per tick: pending events are drained first so
//! hot-plug is handled, then the active pad is sampled into the 23-slot raw
//! source frame. With no pad attached every source reads the always-low
//! floor, so a disconnect drops the craft's channels instead of freezing
//! them mid-stick.

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use signal_core::SOURCES;
use tracing::info;

/// Analog sources: left stick X/Y, right stick X/Y, both triggers.
const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Button sources 6..=20, in raw-id order.
const BUTTON_ORDER: [Button; 15] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// The gamepad input source.
pub struct PadSource {
    gilrs: Gilrs,
    active: Option<GamepadId>,
}

impl PadSource {
    /// Initialise the gamepad subsystem and adopt the first connected pad,
    /// if any. A missing pad is not an error; a dead subsystem is.
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        let active = gilrs.gamepads().next().map(|(id, pad)| {
            info!("controller connected: {}", pad.name());
            id
        });
        if active.is_none() {
            info!("no controller connected, transmitting the neutral floor");
        }
        Ok(Self { gilrs, active })
    }

    #[must_use]
    pub fn connected(&self) -> bool {
        self.active.is_some()
    }

    /// Drain pending events, tracking hot-plug.
    pub fn poll(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    if self.active.is_none() {
                        info!(
                            "controller connected: {}",
                            self.gilrs.gamepad(event.id).name()
                        );
                        self.active = Some(event.id);
                    }
                }
                EventType::Disconnected => {
                    if self.active == Some(event.id) {
                        info!("controller disconnected");
                        // Fall back to another pad if one is still attached.
                        self.active = self.gilrs.gamepads().next().map(|(id, _)| id);
                    }
                }
                _ => {}
            }
        }
    }

    /// Sample all raw sources.
    ///
    /// Indices 0..=5 are the analog axes, 6..=20 the buttons as full-rail
    /// values, 21 is reserved, 22 the always-low constant.
    pub fn sample(&self, raw: &mut [i16; SOURCES]) {
        let Some(id) = self.active else {
            raw.fill(i16::MIN);
            return;
        };
        let pad = self.gilrs.gamepad(id);

        for (slot, &axis) in raw[..6].iter_mut().zip(AXIS_ORDER.iter()) {
            let value = pad.axis_data(axis).map(|a| a.value()).unwrap_or(0.0);
            *slot = (value * 32767.0).round() as i16;
        }

        for (slot, &button) in raw[6..21].iter_mut().zip(BUTTON_ORDER.iter()) {
            *slot = if pad.is_pressed(button) {
                i16::MAX
            } else {
                i16::MIN
            };
        }

        raw[21] = i16::MIN;
        raw[22] = i16::MIN;
    }
}
