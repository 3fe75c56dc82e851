//! Startup settings.
//!
//! A JSON file seeds the tuning cells and the mapping table at startup; the
//! control plane takes over from there. Every field is optional and every
//! failure mode (missing file, broken JSON, out-of-range values) falls back
//! to the built-in defaults; configuration is never fatal.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use signal_core::{ChannelConfig, InputMapper, SharedTuning, CHANNELS, SOURCES, SRC_ALWAYS_LOW};
use tracing::{info, warn};

/// Default settings location, relative to the working directory.
pub const SETTINGS_PATH: &str = "config/settings.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicit serial device path; tried before the built-in candidates.
    pub serial_port: Option<String>,
    /// UDP port the control plane binds.
    pub control_port: u16,
    pub tuning: TuningSettings,
    pub mapping: MappingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_port: None,
            control_port: crate::CONTROL_PORT,
            tuning: TuningSettings::default(),
            mapping: MappingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    pub left_deadzone: f32,
    pub right_deadzone: f32,
    pub sensitivity: f32,
    pub lowpass_alpha: f32,
    pub curve: u8,
    pub expo: f32,
    pub cinematic_on: bool,
    pub cinematic_speed: f32,
    pub cinematic_accel: f32,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            left_deadzone: 0.05,
            right_deadzone: 0.05,
            sensitivity: 1.0,
            lowpass_alpha: 0.2,
            curve: 0,
            expo: 0.0,
            cinematic_on: false,
            cinematic_speed: 5.0,
            cinematic_accel: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Direct channel assignments.
    pub defaults: Vec<DirectEntry>,
    /// Split-mix overrides, applied after the direct list.
    pub custom: Vec<SplitEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectEntry {
    pub ch: i16,
    pub src: i16,
    #[serde(default)]
    pub inv: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitEntry {
    pub ch: i16,
    pub pos_src: i16,
    pub neg_src: i16,
    #[serde(default)]
    pub pos_center: bool,
    #[serde(default)]
    pub pos_reverse: bool,
    #[serde(default)]
    pub neg_center: bool,
    #[serde(default)]
    pub neg_reverse: bool,
}

/// Load settings, falling back to defaults on any failure.
#[must_use]
pub fn load(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            info!("no settings file at {}, using defaults", path.display());
            return Settings::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(settings) => {
            info!("loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            warn!("settings file {} is invalid ({e}), using defaults", path.display());
            Settings::default()
        }
    }
}

impl Settings {
    /// Seed the shared tuning cells. The setters clamp, so out-of-range
    /// file values degrade to the nearest legal ones.
    pub fn apply_tuning(&self, tuning: &SharedTuning) {
        let t = &self.tuning;
        tuning.set_left_deadzone(t.left_deadzone);
        tuning.set_right_deadzone(t.right_deadzone);
        tuning.set_sensitivity(t.sensitivity);
        tuning.set_smoothing(t.lowpass_alpha);
        tuning.set_curve(t.curve);
        tuning.set_expo(t.expo);
        tuning.set_cine_on(t.cinematic_on);
        tuning.set_cine_speed(t.cinematic_speed);
        tuning.set_cine_accel(t.cinematic_accel);
    }

    /// Build the initial routing table.
    #[must_use]
    pub fn build_mapper(&self) -> InputMapper {
        let mut mapper = InputMapper::new();

        for entry in &self.mapping.defaults {
            let Some(ch) = channel_index(entry.ch) else {
                continue;
            };
            mapper.set_channel(
                ch,
                ChannelConfig::Direct {
                    src: source_id(entry.src),
                    inverted: entry.inv,
                },
            );
        }

        for entry in &self.mapping.custom {
            let Some(ch) = channel_index(entry.ch) else {
                continue;
            };
            mapper.set_channel(
                ch,
                ChannelConfig::Split {
                    pos_src: source_id(entry.pos_src),
                    neg_src: source_id(entry.neg_src),
                    pos_center: entry.pos_center,
                    pos_reverse: entry.pos_reverse,
                    neg_center: entry.neg_center,
                    neg_reverse: entry.neg_reverse,
                },
            );
        }

        mapper
    }
}

fn channel_index(ch: i16) -> Option<usize> {
    usize::try_from(ch).ok().filter(|&ch| ch < CHANNELS)
}

fn source_id(src: i16) -> u8 {
    if (0..SOURCES as i16).contains(&src) {
        src as u8
    } else {
        SRC_ALWAYS_LOW
    }
}
