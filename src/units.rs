//! Index to physical unit conversions.
//!
//! Every conversion between a matrix row/column and a depth, a travel time
//! or a distance goes through [`UnitConverter`].

use crate::constants::SPEED_OF_LIGHT;
use crate::error::{GprError, Result};
use crate::survey::RadarSurvey;

/// Maximum imaged depth in metres for a two-way travel time window.
///
/// `depth = (t_max_ns * 1e-9) * (c / sqrt(eps)) / 2`
///
/// # Example
/// ```
/// use radargram::units::depth_max;
///
/// let depth = depth_max(100.0, 4.0).unwrap();
/// assert!((depth - 7.5).abs() < 1e-12);
/// ```
pub fn depth_max(max_time_ns: f64, relative_permittivity: f64) -> Result<f64> {
    if !relative_permittivity.is_finite() || relative_permittivity <= 0.0 {
        return Err(GprError::InvalidParameter(format!(
            "relative permittivity must be > 0, got {}",
            relative_permittivity
        )));
    }
    if !max_time_ns.is_finite() || max_time_ns < 0.0 {
        return Err(GprError::InvalidParameter(format!(
            "time window must be >= 0 ns, got {}",
            max_time_ns
        )));
    }
    let velocity = SPEED_OF_LIGHT / relative_permittivity.sqrt();
    Ok((max_time_ns * 1e-9) * velocity / 2.0)
}

/// Unit of the vertical (sample) axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalUnit {
    /// Depth in metres
    Depth,
    /// Two-way travel time in nanoseconds
    Time,
    /// Raw sample index
    Samples,
}

/// Unit of the horizontal (trace) axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalUnit {
    /// Distance along the survey line in metres
    Distance,
    /// Acquisition time in the unit of the acquisition step
    Time,
    /// Raw trace index
    Traces,
}

/// Converts row/column indices of a survey matrix into physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    max_time_ns: f64,
    max_distance_m: f64,
    acquisition_step: f64,
    sample_count: usize,
    trace_count: usize,
    relative_permittivity: f64,
    depth_max_m: f64,
}

impl UnitConverter {
    /// # Errors
    /// `GprError::InvalidParameter` for a non-positive permittivity, a
    /// negative time window or distance, or zero counts.
    pub fn new(
        max_time_ns: f64,
        max_distance_m: f64,
        acquisition_step: f64,
        sample_count: usize,
        trace_count: usize,
        relative_permittivity: f64,
    ) -> Result<Self> {
        if sample_count == 0 || trace_count == 0 {
            return Err(GprError::InvalidParameter(format!(
                "sample and trace counts must be > 0, got {}x{}",
                sample_count, trace_count
            )));
        }
        if !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Err(GprError::InvalidParameter(format!(
                "survey length must be >= 0 m, got {}",
                max_distance_m
            )));
        }
        let depth_max_m = depth_max(max_time_ns, relative_permittivity)?;
        Ok(Self {
            max_time_ns,
            max_distance_m,
            acquisition_step,
            sample_count,
            trace_count,
            relative_permittivity,
            depth_max_m,
        })
    }

    pub fn for_survey(survey: &RadarSurvey, relative_permittivity: f64) -> Result<Self> {
        Self::new(
            survey.max_time_ns(),
            survey.max_distance_m(),
            survey.acquisition_step(),
            survey.sample_count(),
            survey.trace_count(),
            relative_permittivity,
        )
    }

    /// Replace the survey length, e.g. with a value measured on site.
    pub fn with_max_distance(self, max_distance_m: f64) -> Result<Self> {
        Self::new(
            self.max_time_ns,
            max_distance_m,
            self.acquisition_step,
            self.sample_count,
            self.trace_count,
            self.relative_permittivity,
        )
    }

    pub fn relative_permittivity(&self) -> f64 {
        self.relative_permittivity
    }

    pub fn depth_max_m(&self) -> f64 {
        self.depth_max_m
    }

    pub fn max_time_ns(&self) -> f64 {
        self.max_time_ns
    }

    pub fn max_distance_m(&self) -> f64 {
        self.max_distance_m
    }

    pub fn depth_step_m(&self) -> f64 {
        self.depth_max_m / self.sample_count as f64
    }

    pub fn time_step_ns(&self) -> f64 {
        self.max_time_ns / self.sample_count as f64
    }

    pub fn distance_step_m(&self) -> f64 {
        self.max_distance_m / self.trace_count as f64
    }

    pub fn row_to_depth_m(&self, row: usize) -> f64 {
        row as f64 * self.depth_step_m()
    }

    pub fn row_to_time_ns(&self, row: usize) -> f64 {
        row as f64 * self.time_step_ns()
    }

    pub fn column_to_distance_m(&self, column: usize) -> f64 {
        column as f64 * self.distance_step_m()
    }

    pub fn column_to_time_s(&self, column: usize) -> f64 {
        column as f64 * self.acquisition_step
    }

    /// Row index of a depth, truncated toward zero.
    pub fn depth_m_to_row(&self, depth_m: f64) -> Result<usize> {
        to_index(depth_m, self.depth_step_m(), "depth")
    }

    pub fn time_ns_to_row(&self, time_ns: f64) -> Result<usize> {
        to_index(time_ns, self.time_step_ns(), "time")
    }

    pub fn distance_m_to_column(&self, distance_m: f64) -> Result<usize> {
        to_index(distance_m, self.distance_step_m(), "distance")
    }

    /// Physical size of one row in `unit`.
    pub fn vertical_step(&self, unit: VerticalUnit) -> f64 {
        match unit {
            VerticalUnit::Depth => self.depth_step_m(),
            VerticalUnit::Time => self.time_step_ns(),
            VerticalUnit::Samples => 1.0,
        }
    }

    /// Physical size of one column in `unit`.
    pub fn horizontal_step(&self, unit: HorizontalUnit) -> f64 {
        match unit {
            HorizontalUnit::Distance => self.distance_step_m(),
            HorizontalUnit::Time => self.acquisition_step,
            HorizontalUnit::Traces => 1.0,
        }
    }

    /// Extent of `rows` rows, e.g. of a matrix trimmed with `select_rows`.
    pub fn vertical_extent(&self, unit: VerticalUnit, rows: usize) -> f64 {
        rows as f64 * self.vertical_step(unit)
    }

    /// Extent of `columns` columns, e.g. of a matrix padded with `pad_traces`.
    pub fn horizontal_extent(&self, unit: HorizontalUnit, columns: usize) -> f64 {
        columns as f64 * self.horizontal_step(unit)
    }
}

fn to_index(value: f64, step: f64, what: &str) -> Result<usize> {
    if !value.is_finite() || value < 0.0 {
        return Err(GprError::InvalidParameter(format!(
            "{} must be a finite value >= 0, got {}",
            what, value
        )));
    }
    if step <= 0.0 {
        return Err(GprError::InvalidParameter(format!(
            "{} axis has no physical extent",
            what
        )));
    }
    Ok((value / step).floor() as usize)
}
