//! Amplitude matrix transforms.
//!
//! Matrices have one row per sample (depth) and one column per trace. Every
//! function returns a new matrix and leaves its input untouched.

pub mod background;
pub mod dewow;
pub mod gain;
pub mod lowpass;
pub mod traces;

pub use background::{mean_trace, subtract_mean_trace};
pub use dewow::{DEFAULT_DEWOW_WINDOW, dewow, dewow_with_window};
pub use gain::{GainParams, apply_gain, gain_curve};
pub use lowpass::{DEFAULT_LOW_PASS_ORDER, ZeroPhaseLowpass, low_pass, low_pass_with_order};
pub use traces::{horizontal_flip, pad_traces, select_rows};
