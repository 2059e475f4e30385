//! Processing configuration.
//!
//! A `ProcessingConfig` describes one pass over a survey: which rows to keep,
//! which filters to run and the depth gain to apply. Every stage is optional
//! and `ProcessingConfig::default()` leaves the amplitudes untouched.
//!
//! Configurations can be loaded from TOML:
//!
//! ```toml
//! flip = true
//! mean_trace_window = 50
//!
//! [rows]
//! start = 20
//! end = 400
//!
//! [dewow]
//! window = 9
//!
//! [low_pass]
//! cutoff_hz = 800e6
//! sampling_hz = 5e9
//!
//! [gain]
//! gain_lin = 0.02
//! t0_lin = 40
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{DEFAULT_RELATIVE_PERMITTIVITY, FALLBACK_RELATIVE_PERMITTIVITY};
use crate::error::{GprError, Result};
use crate::signal_processing::{DEFAULT_DEWOW_WINDOW, DEFAULT_LOW_PASS_ORDER, GainParams};
use crate::survey::Channel;

/// Relative permittivity (dielectric constant) of the surveyed medium
///
/// # Example
/// ```
/// use radargram::config::RelativePermittivity;
///
/// let eps: RelativePermittivity = "4".parse().unwrap();
/// assert_eq!(eps.value(), 4.0);
///
/// // Unusable input falls back to 6
/// assert_eq!(RelativePermittivity::parse_or_fallback("abc").value(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePermittivity(f64);

impl RelativePermittivity {
    pub fn new(value: f64) -> Result<Self> {
        if !(value.is_finite() && value > 0.0) {
            return Err(GprError::InvalidParameter(format!(
                "relative permittivity must be > 0, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Parse user input, substituting 6.0 for anything unusable.
    pub fn parse_or_fallback(text: &str) -> Self {
        text.parse().unwrap_or_else(|e| {
            log::warn!(
                "{}; using relative permittivity {}",
                e,
                FALLBACK_RELATIVE_PERMITTIVITY
            );
            Self(FALLBACK_RELATIVE_PERMITTIVITY)
        })
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for RelativePermittivity {
    fn default() -> Self {
        Self(DEFAULT_RELATIVE_PERMITTIVITY)
    }
}

impl fmt::Display for RelativePermittivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelativePermittivity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid relative permittivity: '{}'", s))?;
        Self::new(value).map_err(|e| e.to_string())
    }
}

/// Processing pipeline configuration
///
/// Stages run in a fixed order: row window, dewow, low-pass, mean trace
/// subtraction, flips, gain, padding.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Band to keep from dual-channel surveys; single-channel surveys ignore it
    pub channel: Option<Channel>,
    /// Keep only this row window
    pub rows: Option<RowWindow>,
    /// Remove low-frequency drift
    pub dewow: Option<DewowConfig>,
    /// Zero-phase low-pass filter
    pub low_pass: Option<LowPassConfig>,
    /// Subtract the mean of the first N traces
    pub mean_trace_window: Option<usize>,
    /// Reverse trace order
    pub flip: bool,
    /// Reverse trace order of every second file in a batch
    pub flip_alternate: bool,
    /// Depth gain; the identity when absent
    pub gain: GainParams,
    /// Pad with zero traces up to this count
    pub pad_to: Option<usize>,
}

/// Half-open row range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DewowConfig {
    /// Running mean length in samples
    pub window: usize,
}

impl Default for DewowConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEWOW_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LowPassConfig {
    /// Cutoff in Hz
    pub cutoff_hz: f64,
    /// Sampling frequency along the trace in Hz
    pub sampling_hz: f64,
    /// Butterworth order
    #[serde(default = "default_low_pass_order")]
    pub order: usize,
}

fn default_low_pass_order() -> usize {
    DEFAULT_LOW_PASS_ORDER
}

impl ProcessingConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GprError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GprError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| GprError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded processing config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// True when no stage changes the amplitudes.
    pub fn is_identity(&self) -> bool {
        self.channel.is_none()
            && self.rows.is_none()
            && self.dewow.is_none()
            && self.low_pass.is_none()
            && self.mean_trace_window.is_none()
            && !self.flip
            && !self.flip_alternate
            && self.gain == GainParams::default()
            && self.pad_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permittivity_parsing() {
        let eps: RelativePermittivity = " 4.5 ".parse().unwrap();
        assert_eq!(eps.value(), 4.5);

        assert!("0".parse::<RelativePermittivity>().is_err());
        assert!("-3".parse::<RelativePermittivity>().is_err());
        assert!("inf".parse::<RelativePermittivity>().is_err());
        assert!("".parse::<RelativePermittivity>().is_err());
    }

    #[test]
    fn test_permittivity_fallback() {
        assert_eq!(RelativePermittivity::parse_or_fallback("9").value(), 9.0);
        assert_eq!(RelativePermittivity::parse_or_fallback("abc").value(), 6.0);
        assert_eq!(RelativePermittivity::parse_or_fallback("0").value(), 6.0);
    }

    #[test]
    fn test_permittivity_default() {
        assert_eq!(RelativePermittivity::default().value(), 8.0);
    }

    #[test]
    fn test_default_is_identity() {
        let config = ProcessingConfig::default();
        assert!(config.is_identity());
        assert_eq!(ProcessingConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_full_toml() {
        let text = r#"
            channel = "b"
            flip = true
            flip_alternate = true
            mean_trace_window = 50
            pad_to = 900

            [rows]
            start = 20
            end = 400

            [dewow]

            [low_pass]
            cutoff_hz = 800e6
            sampling_hz = 5e9

            [gain]
            gain_lin = 0.02
            t0_lin = 40
        "#;
        let config = ProcessingConfig::from_toml_str(text).unwrap();
        assert!(!config.is_identity());
        assert_eq!(config.channel, Some(Channel::B));
        assert_eq!(config.rows, Some(RowWindow { start: 20, end: 400 }));
        assert_eq!(config.dewow.unwrap().window, DEFAULT_DEWOW_WINDOW);
        let low_pass = config.low_pass.unwrap();
        assert_eq!(low_pass.order, DEFAULT_LOW_PASS_ORDER);
        assert_eq!(low_pass.cutoff_hz, 800e6);
        assert_eq!(config.mean_trace_window, Some(50));
        assert_eq!(config.gain.t0_lin, 40);
        assert_eq!(config.gain.gain_const, 1.0);
        assert_eq!(config.pad_to, Some(900));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = ProcessingConfig::from_toml_str("dewow_window = 3").unwrap_err();
        assert!(matches!(err, GprError::Config(_)));
    }

    #[test]
    fn test_low_pass_requires_cutoff() {
        assert!(ProcessingConfig::from_toml_str("[low_pass]\nsampling_hz = 1e9").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProcessingConfig::load("/nonexistent/processing.toml").unwrap_err();
        assert!(matches!(err, GprError::Config(_)));
    }
}
