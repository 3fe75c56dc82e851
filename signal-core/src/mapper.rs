//! Input routing: 23 raw sources onto 16 logical channels.
//!
//! Every logical channel is driven by a [`ChannelConfig`]: either a direct
//! source lookup (optionally inverted) or a split mix of two sources, each
//! optionally recentered and reversed. Unknown source ids resolve to the
//! always-low floor rather than an out-of-range read.

/// Number of raw input sources: 4 stick axes, 2 triggers, 15 buttons,
/// 1 reserved, 1 always-low.
pub const SOURCES: usize = 23;

/// Number of logical output channels.
pub const CHANNELS: usize = 16;

/// The always-low constant source. Channels default here so an unmapped
/// channel transmits the low rail instead of mid-stick.
pub const SRC_ALWAYS_LOW: u8 = 22;

/// Routing configuration for one logical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelConfig {
    /// Copy one source, optionally inverted.
    Direct { src: u8, inverted: bool },
    /// Sum two transformed sources.
    ///
    /// Each side is optionally recentered (`2x - 32768`, turning a 0-based
    /// half-range input such as a trigger into a full-range signal) and
    /// optionally reversed, then the sides are added and clamped.
    Split {
        pos_src: u8,
        neg_src: u8,
        pos_center: bool,
        pos_reverse: bool,
        neg_center: bool,
        neg_reverse: bool,
    },
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig::Direct {
            src: SRC_ALWAYS_LOW,
            inverted: false,
        }
    }
}

/// Split-mix routing update: the second half of a mapping packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpec {
    /// Logical channel the split drives. Out-of-range targets are ignored.
    pub target: i16,
    pub pos_src: i16,
    pub neg_src: i16,
    pub pos_center: bool,
    pub pos_reverse: bool,
    pub neg_center: bool,
    pub neg_reverse: bool,
}

/// The routing table.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    channels: [ChannelConfig; CHANNELS],
}

impl InputMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current configuration of one channel.
    #[must_use]
    pub fn channel(&self, ch: usize) -> Option<ChannelConfig> {
        self.channels.get(ch).copied()
    }

    /// Replace the configuration of one channel. Out-of-range channels are
    /// ignored.
    pub fn set_channel(&mut self, ch: usize, config: ChannelConfig) {
        if let Some(slot) = self.channels.get_mut(ch) {
            *slot = config;
        }
    }

    /// Project the raw sources onto the logical channels.
    pub fn update(&self, raw: &[i16; SOURCES], out: &mut [i16; CHANNELS]) {
        for (config, slot) in self.channels.iter().zip(out.iter_mut()) {
            *slot = match *config {
                ChannelConfig::Direct { src, inverted } => {
                    let v = source_value(raw, src) as i32;
                    let v = if inverted { -v } else { v };
                    clamp_i16(v)
                }
                ChannelConfig::Split {
                    pos_src,
                    neg_src,
                    pos_center,
                    pos_reverse,
                    neg_center,
                    neg_reverse,
                } => {
                    let p = transform(source_value(raw, pos_src), pos_center, pos_reverse);
                    let n = transform(source_value(raw, neg_src), neg_center, neg_reverse);
                    clamp_i16(p as i32 + n as i32)
                }
            };
        }
    }

    /// Apply a full mapping packet: 16 direct source ids, then an optional
    /// split override.
    ///
    /// The direct list resets every channel to an uninverted direct lookup;
    /// ids outside the source range land on the always-low floor. A split
    /// whose target is outside the channel range is ignored.
    pub fn apply_packet(&mut self, direct: &[i16; CHANNELS], split: Option<SplitSpec>) {
        for (slot, &id) in self.channels.iter_mut().zip(direct.iter()) {
            *slot = ChannelConfig::Direct {
                src: normalize_source(id),
                inverted: false,
            };
        }

        if let Some(s) = split {
            let Ok(target) = usize::try_from(s.target) else {
                return;
            };
            if target >= CHANNELS {
                return;
            }
            self.channels[target] = ChannelConfig::Split {
                pos_src: normalize_source(s.pos_src),
                neg_src: normalize_source(s.neg_src),
                pos_center: s.pos_center,
                pos_reverse: s.pos_reverse,
                neg_center: s.neg_center,
                neg_reverse: s.neg_reverse,
            };
        }
    }
}

/// One side of a split mix: recenter, reverse, clamp.
fn transform(x: i16, center: bool, reverse: bool) -> i16 {
    let mut v = x as i32;
    if center {
        v = 2 * v - 32768;
    }
    if reverse {
        v = -v;
    }
    clamp_i16(v)
}

#[inline]
fn source_value(raw: &[i16; SOURCES], id: u8) -> i16 {
    raw.get(id as usize).copied().unwrap_or(i16::MIN)
}

#[inline]
fn normalize_source(id: i16) -> u8 {
    if (0..SOURCES as i16).contains(&id) {
        id as u8
    } else {
        SRC_ALWAYS_LOW
    }
}

#[inline]
fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw_ramp() -> [i16; SOURCES] {
        let mut raw = [0i16; SOURCES];
        for (i, v) in raw.iter_mut().enumerate() {
            *v = (i as i16) * 1000 - 11000;
        }
        raw
    }

    fn identity_mapper() -> InputMapper {
        let mut mapper = InputMapper::new();
        for ch in 0..CHANNELS {
            mapper.set_channel(
                ch,
                ChannelConfig::Direct {
                    src: ch as u8,
                    inverted: false,
                },
            );
        }
        mapper
    }

    #[test]
    fn test_default_channels_sit_on_the_floor() {
        let mapper = InputMapper::new();
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw_ramp(), &mut out);
        assert_eq!(out, [i16::MIN; CHANNELS]);
    }

    #[test]
    fn test_identity_mapping() {
        let mapper = identity_mapper();
        let raw = raw_ramp();
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw, &mut out);
        assert_eq!(&out[..], &raw[..CHANNELS]);
    }

    #[test]
    fn test_inverted_direct_clamps_min() {
        let mut mapper = InputMapper::new();
        mapper.set_channel(
            0,
            ChannelConfig::Direct {
                src: 0,
                inverted: true,
            },
        );
        let mut raw = [0i16; SOURCES];
        raw[0] = i16::MIN;
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw, &mut out);
        // -(-32768) does not fit an i16 and clamps to the positive rail.
        assert_eq!(out[0], i16::MAX);
    }

    #[test]
    fn test_unknown_source_resolves_low() {
        let mut mapper = InputMapper::new();
        mapper.set_channel(
            0,
            ChannelConfig::Direct {
                src: 23,
                inverted: false,
            },
        );
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw_ramp(), &mut out);
        assert_eq!(out[0], i16::MIN);
    }

    #[test]
    fn test_split_difference() {
        // pos - neg via a reversed negative side, no recentering.
        let mut mapper = InputMapper::new();
        mapper.set_channel(
            5,
            ChannelConfig::Split {
                pos_src: 0,
                neg_src: 1,
                pos_center: false,
                pos_reverse: false,
                neg_center: false,
                neg_reverse: true,
            },
        );
        let mut raw = [0i16; SOURCES];
        raw[0] = 12000;
        raw[1] = 5000;
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw, &mut out);
        assert_eq!(out[5], 7000);
    }

    #[test]
    fn test_split_recenter_case() {
        // raw[6] = 0 recentered to -32768, raw[7] = -1 reversed to +1.
        let mut mapper = InputMapper::new();
        mapper.set_channel(
            3,
            ChannelConfig::Split {
                pos_src: 6,
                neg_src: 7,
                pos_center: true,
                pos_reverse: false,
                neg_center: false,
                neg_reverse: true,
            },
        );
        let mut raw = [0i16; SOURCES];
        raw[6] = 0;
        raw[7] = -1;
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw, &mut out);
        assert_eq!(out[3], -32767);
    }

    #[test]
    fn test_apply_packet_direct_and_split() {
        let mut mapper = InputMapper::new();
        let mut direct = [SRC_ALWAYS_LOW as i16; CHANNELS];
        direct[0] = 0;
        direct[1] = 1;
        direct[2] = 2;
        direct[3] = 3;

        mapper.apply_packet(
            &direct,
            Some(SplitSpec {
                target: 3,
                pos_src: 0,
                neg_src: 1,
                pos_center: false,
                pos_reverse: false,
                neg_center: false,
                neg_reverse: true,
            }),
        );

        let mut raw = [0i16; SOURCES];
        raw[0] = 20000;
        raw[1] = -15000;
        let mut out = [0i16; CHANNELS];
        mapper.update(&raw, &mut out);
        assert_eq!(out[0], 20000);
        assert_eq!(out[1], -15000);
        assert_eq!(out[3], i16::MAX); // 20000 + 15000 clamps
    }

    #[test]
    fn test_apply_packet_ignores_bad_split_target() {
        let mut mapper = InputMapper::new();
        let direct = [0i16; CHANNELS];
        mapper.apply_packet(
            &direct,
            Some(SplitSpec {
                target: 16,
                pos_src: 0,
                neg_src: 1,
                pos_center: false,
                pos_reverse: false,
                neg_center: false,
                neg_reverse: false,
            }),
        );
        for ch in 0..CHANNELS {
            assert_eq!(
                mapper.channel(ch),
                Some(ChannelConfig::Direct {
                    src: 0,
                    inverted: false
                })
            );
        }
    }

    #[test]
    fn test_apply_packet_normalizes_bad_sources() {
        let mut mapper = InputMapper::new();
        let mut direct = [0i16; CHANNELS];
        direct[4] = -3;
        direct[5] = 99;
        mapper.apply_packet(&direct, None);
        assert_eq!(
            mapper.channel(4),
            Some(ChannelConfig::Direct {
                src: SRC_ALWAYS_LOW,
                inverted: false
            })
        );
        assert_eq!(
            mapper.channel(5),
            Some(ChannelConfig::Direct {
                src: SRC_ALWAYS_LOW,
                inverted: false
            })
        );
    }

    proptest! {
        // Identity mapping reproduces the first 16 raw values exactly.
        #[test]
        fn prop_identity_fidelity(raw in prop::array::uniform23(i16::MIN..=i16::MAX)) {
            let mapper = identity_mapper();
            let mut out = [0i16; CHANNELS];
            mapper.update(&raw, &mut out);
            prop_assert_eq!(&out[..], &raw[..CHANNELS]);
        }

        // Split difference equals the clamped subtraction. b = i16::MIN is
        // excluded: its reversal already saturates per side.
        #[test]
        fn prop_split_difference(a in i16::MIN..=i16::MAX, b in (i16::MIN + 1)..=i16::MAX) {
            let mut mapper = InputMapper::new();
            mapper.set_channel(0, ChannelConfig::Split {
                pos_src: 0,
                neg_src: 1,
                pos_center: false,
                pos_reverse: false,
                neg_center: false,
                neg_reverse: true,
            });
            let mut raw = [0i16; SOURCES];
            raw[0] = a;
            raw[1] = b;
            let mut out = [0i16; CHANNELS];
            mapper.update(&raw, &mut out);

            let expected = (a as i32 - b as i32)
                .clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            prop_assert_eq!(out[0], expected);
        }

        // Output always stays inside the i16 rails regardless of config.
        #[test]
        fn prop_output_in_range(
            raw in prop::array::uniform23(i16::MIN..=i16::MAX),
            pos in 0u8..SOURCES as u8,
            neg in 0u8..SOURCES as u8,
            flags in prop::array::uniform4(any::<bool>()),
        ) {
            let mut mapper = InputMapper::new();
            mapper.set_channel(0, ChannelConfig::Split {
                pos_src: pos,
                neg_src: neg,
                pos_center: flags[0],
                pos_reverse: flags[1],
                neg_center: flags[2],
                neg_reverse: flags[3],
            });
            let mut out = [0i16; CHANNELS];
            mapper.update(&raw, &mut out);
            // The type system already guarantees the range; this asserts the
            // update never panics on any flag combination.
        }
    }
}
