//! Physical and hardware constants
//!
//! Values here are fixed by physics or by the acquisition hardware and are
//! never derived from a survey file.

use std::ops::Range;

/// Propagation speed of the radar pulse in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Relative permittivity substituted by callers when the user value is invalid.
pub const FALLBACK_RELATIVE_PERMITTIVITY: f64 = 6.0;

/// Relative permittivity used before the user enters one.
pub const DEFAULT_RELATIVE_PERMITTIVITY: f64 = 8.0;

/// Sample sub-range of the first band of a dual-channel antenna.
pub const DUAL_CHANNEL_A: Range<usize> = 0..1022;

/// Sample sub-range of the second band of a dual-channel antenna.
pub const DUAL_CHANNEL_B: Range<usize> = 1025..2046;

/// Samples after `t0` at which the exponential gain term reaches `gain_exp`-fold.
pub const EXP_GAIN_RAMP_SAMPLES: f64 = 75.0;

/// Size of one GSSI header block; DZT files carry one block per channel.
pub const DZT_HEADER_BLOCK: usize = 1024;

/// Highest channel count a DZT header may declare.
pub const DZT_MAX_CHANNELS: usize = 4;
