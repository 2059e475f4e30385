mod csv;
mod json;
mod text;

use std::path::Path;

use chrono::Utc;
use ndarray::Array2;
use rolling_stats::Stats;
use serde::Serialize;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

use crate::error::Result;
use crate::format::SurveyFormat;
use crate::survey::{Channel, RadarSurvey};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmplitudeSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl AmplitudeSummary {
    pub fn from_matrix(matrix: &Array2<f64>) -> Option<Self> {
        let mut stats: Stats<f64> = Stats::new();
        for &value in matrix.iter() {
            stats.update(value);
        }
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Per-file summary of a decoded (and possibly processed) survey
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub filename: String,
    pub format: Option<SurveyFormat>,
    pub antenna: String,
    pub traces: usize,
    pub samples: usize,
    pub max_time_ns: f64,
    pub max_distance_m: f64,
    pub acquisition_step: f64,
    pub dual_channel: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub relative_permittivity: f64,
    pub depth_max_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<String>,
    pub amplitude: Option<AmplitudeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SurveyReport {
    /// Summarise `amplitudes`, the survey's own matrix or a processed copy.
    pub fn new(
        path: &Path,
        survey: &RadarSurvey,
        amplitudes: &Array2<f64>,
        relative_permittivity: f64,
    ) -> Result<Self> {
        let units = survey.unit_converter(relative_permittivity)?;
        Ok(Self {
            filename: display_name(path),
            format: Some(survey.format()),
            antenna: survey.antenna_label().to_string(),
            traces: amplitudes.ncols(),
            samples: amplitudes.nrows(),
            max_time_ns: survey.max_time_ns(),
            max_distance_m: survey.max_distance_m(),
            acquisition_step: survey.acquisition_step(),
            dual_channel: survey.dual_channel(),
            channel: survey.active_channel(),
            relative_permittivity,
            depth_max_m: units.depth_max_m(),
            acquired_at: survey
                .acquired_at()
                .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string()),
            amplitude: AmplitudeSummary::from_matrix(amplitudes),
            error: None,
        })
    }

    pub fn failed(path: &Path, error: &dyn std::error::Error) -> Self {
        Self {
            filename: display_name(path),
            format: SurveyFormat::from_path(path).ok(),
            antenna: String::new(),
            traces: 0,
            samples: 0,
            max_time_ns: 0.0,
            max_distance_m: 0.0,
            acquisition_step: 0.0,
            dual_channel: false,
            channel: None,
            relative_permittivity: 0.0,
            depth_max_m: 0.0,
            acquired_at: None,
            amplitude: None,
            error: Some(error.to_string()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub trait Formatter {
    /// Whole report for a batch of files.
    fn format(&self, reports: &[SurveyReport]) -> Result<String>;
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Csv => Box::new(CsvFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::survey::SurveyMetadata;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    pub(super) fn sample_report() -> SurveyReport {
        let metadata = SurveyMetadata {
            format: SurveyFormat::Dzt,
            max_distance_m: 12.5,
            max_time_ns: 100.0,
            acquisition_step: 0.05,
            antenna_label: "3200MLF".to_string(),
            dual_channel: false,
            acquired_at: NaiveDate::from_ymd_opt(2021, 6, 3).and_then(|d| d.and_hms_opt(9, 30, 0)),
        };
        let amplitudes = Array2::from_shape_fn((4, 3), |(i, j)| (i + j) as f64);
        let survey = RadarSurvey::new(metadata, amplitudes.clone()).unwrap();
        SurveyReport::new(Path::new("/data/line01.dzt"), &survey, &amplitudes, 4.0).unwrap()
    }

    #[test]
    fn test_report_fields() {
        let report = sample_report();
        assert_eq!(report.filename, "line01.dzt");
        assert_eq!(report.format, Some(SurveyFormat::Dzt));
        assert_eq!((report.samples, report.traces), (4, 3));
        assert_abs_diff_eq!(report.depth_max_m, 7.5, epsilon = 1e-12);
        assert_eq!(report.acquired_at.as_deref(), Some("2021-06-03T09:30:00"));

        let amplitude = report.amplitude.unwrap();
        assert_eq!(amplitude.count, 12);
        assert_abs_diff_eq!(amplitude.mean, 2.5, epsilon = 1e-9);
        assert_eq!(amplitude.min, 0.0);
        assert_eq!(amplitude.max, 5.0);
    }

    #[test]
    fn test_failed_report() {
        let err = FormatError::FileNotFound("/data/line02.rd3".into());
        let report = SurveyReport::failed(Path::new("/data/line02.rd3"), &err);
        assert_eq!(report.format, Some(SurveyFormat::Rd3));
        assert!(report.error.unwrap().contains("line02.rd3"));
        assert!(report.amplitude.is_none());
    }
}
