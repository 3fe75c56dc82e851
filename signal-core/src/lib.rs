//! Signal routing and conditioning for a radio-control handset.
//!
//! This crate holds the pure signal path between the raw input sources and
//! the wire encoder, with no I/O of its own:
//!
//! - [`mapper`]: the routing table projecting 23 raw sources onto 16
//!   logical channels, with split-mix support ([`InputMapper`])
//! - [`mixer`]: the channel-level extension seam ([`Mixer`])
//! - [`tuning`]: the per-axis conditioning pipeline ([`condition`]) and its
//!   parameters ([`AxisTuning`], [`AxisState`])
//! - [`shared`]: the per-field atomic tuning cells the control plane writes
//!   and the control loop snapshots ([`SharedTuning`])

pub mod mapper;
pub mod mixer;
pub mod shared;
pub mod tuning;

pub use mapper::{ChannelConfig, InputMapper, SplitSpec, CHANNELS, SOURCES, SRC_ALWAYS_LOW};
pub use mixer::Mixer;
pub use shared::SharedTuning;
pub use tuning::{condition, AxisState, AxisTuning, CurveKind, TICK_DT};
