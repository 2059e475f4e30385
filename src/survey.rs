use std::ops::Range;

use chrono::NaiveDateTime;
use ndarray::{Array2, s};

use crate::constants::{DUAL_CHANNEL_A, DUAL_CHANNEL_B};
use crate::error::{GprError, Result};
use crate::format::SurveyFormat;
use crate::units::UnitConverter;

/// Frequency band of a dual-channel antenna
///
/// Both bands are interleaved in one raw trace buffer at fixed,
/// hardware-defined sample offsets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    A,
    B,
}

impl Channel {
    pub fn sample_range(self) -> Range<usize> {
        match self {
            Channel::A => DUAL_CHANNEL_A,
            Channel::B => DUAL_CHANNEL_B,
        }
    }
}

/// Header-level description of a survey, as recovered by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMetadata {
    pub format: SurveyFormat,
    /// Physical length of the survey line, 0 when the file does not say
    pub max_distance_m: f64,
    /// Two-way travel time window per trace
    pub max_time_ns: f64,
    /// Spacing between traces (seconds, or metres for distance-triggered files)
    pub acquisition_step: f64,
    pub antenna_label: String,
    pub dual_channel: bool,
    pub acquired_at: Option<NaiveDateTime>,
}

/// A decoded radar survey: metadata plus an amplitude matrix of
/// `sample_count` rows by `trace_count` columns.
///
/// Surveys are never modified after construction; processing functions
/// return new matrices, so one survey can feed several processing variants.
#[derive(Debug, Clone)]
pub struct RadarSurvey {
    metadata: SurveyMetadata,
    active_channel: Option<Channel>,
    amplitudes: Array2<f64>,
}

impl RadarSurvey {
    /// # Errors
    /// `GprError::InvalidParameter` if the matrix is empty, the time window
    /// or acquisition step is not positive, the distance is negative, or a
    /// dual-channel buffer is too short for both bands.
    pub fn new(metadata: SurveyMetadata, amplitudes: Array2<f64>) -> Result<Self> {
        let (samples, traces) = amplitudes.dim();
        if samples == 0 || traces == 0 {
            return Err(GprError::InvalidParameter(format!(
                "amplitude matrix must be non-empty, got {}x{}",
                samples, traces
            )));
        }
        if !(metadata.max_time_ns.is_finite() && metadata.max_time_ns > 0.0) {
            return Err(GprError::InvalidParameter(format!(
                "time window must be > 0 ns, got {}",
                metadata.max_time_ns
            )));
        }
        if !(metadata.acquisition_step.is_finite() && metadata.acquisition_step > 0.0) {
            return Err(GprError::InvalidParameter(format!(
                "acquisition step must be > 0, got {}",
                metadata.acquisition_step
            )));
        }
        if !(metadata.max_distance_m.is_finite() && metadata.max_distance_m >= 0.0) {
            return Err(GprError::InvalidParameter(format!(
                "survey length must be >= 0 m, got {}",
                metadata.max_distance_m
            )));
        }
        if metadata.dual_channel && samples < DUAL_CHANNEL_B.end {
            return Err(GprError::InvalidParameter(format!(
                "dual-channel buffer needs {} samples, got {}",
                DUAL_CHANNEL_B.end, samples
            )));
        }

        Ok(Self {
            metadata,
            active_channel: None,
            amplitudes,
        })
    }

    /// Restrict a dual-channel survey to one band.
    ///
    /// The returned survey keeps the time window of the source: each band
    /// spans the full recorded window.
    pub fn select_channel(&self, channel: Channel) -> Result<RadarSurvey> {
        if !self.metadata.dual_channel {
            return Err(GprError::InvalidParameter(format!(
                "antenna '{}' is not dual-channel",
                self.metadata.antenna_label
            )));
        }
        if let Some(active) = self.active_channel {
            return Err(GprError::InvalidParameter(format!(
                "channel {:?} already selected",
                active
            )));
        }
        let range = channel.sample_range();
        let amplitudes = self.amplitudes.slice(s![range, ..]).to_owned();
        log::debug!(
            "Selected channel {:?}: {} samples per trace",
            channel,
            amplitudes.nrows()
        );
        Ok(RadarSurvey {
            metadata: self.metadata.clone(),
            active_channel: Some(channel),
            amplitudes,
        })
    }

    pub fn unit_converter(&self, relative_permittivity: f64) -> Result<UnitConverter> {
        UnitConverter::for_survey(self, relative_permittivity)
    }

    pub fn metadata(&self) -> &SurveyMetadata {
        &self.metadata
    }

    pub fn format(&self) -> SurveyFormat {
        self.metadata.format
    }

    pub fn trace_count(&self) -> usize {
        self.amplitudes.ncols()
    }

    pub fn sample_count(&self) -> usize {
        self.amplitudes.nrows()
    }

    pub fn max_distance_m(&self) -> f64 {
        self.metadata.max_distance_m
    }

    pub fn max_time_ns(&self) -> f64 {
        self.metadata.max_time_ns
    }

    pub fn acquisition_step(&self) -> f64 {
        self.metadata.acquisition_step
    }

    pub fn antenna_label(&self) -> &str {
        &self.metadata.antenna_label
    }

    pub fn dual_channel(&self) -> bool {
        self.metadata.dual_channel
    }

    pub fn active_channel(&self) -> Option<Channel> {
        self.active_channel
    }

    pub fn acquired_at(&self) -> Option<NaiveDateTime> {
        self.metadata.acquired_at
    }

    pub fn amplitudes(&self) -> &Array2<f64> {
        &self.amplitudes
    }
}
