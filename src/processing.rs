use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::config::ProcessingConfig;
use crate::error::{GprError, Result};
use crate::format;
use crate::signal_processing::{
    GainParams, ZeroPhaseLowpass, apply_gain, dewow_with_window, horizontal_flip, pad_traces,
    select_rows, subtract_mean_trace,
};
use crate::survey::RadarSurvey;

/// Runs a [`ProcessingConfig`] over surveys
///
/// Filter parameters are validated once on construction, so a processor
/// that builds can only fail on survey-dependent checks (row window or
/// mean trace window out of range).
#[derive(Debug, Clone)]
pub struct SurveyProcessor {
    config: ProcessingConfig,
    lowpass: Option<ZeroPhaseLowpass>,
}

impl SurveyProcessor {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        if config.dewow.is_some_and(|dewow| dewow.window == 0) {
            return Err(GprError::InvalidParameter(
                "dewow window must be at least 1 sample".to_string(),
            ));
        }
        if let Some(rows) = config.rows {
            if rows.start >= rows.end {
                return Err(GprError::InvalidRange(format!(
                    "empty row window [{}, {})",
                    rows.start, rows.end
                )));
            }
        }
        if config.mean_trace_window == Some(0) {
            return Err(GprError::InvalidParameter(
                "mean trace window must be at least 1 trace".to_string(),
            ));
        }
        let lowpass = config
            .low_pass
            .map(|lp| ZeroPhaseLowpass::new(lp.cutoff_hz, lp.sampling_hz, lp.order))
            .transpose()?;

        Ok(Self { config, lowpass })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// The survey the pipeline actually sees: the configured band of a
    /// dual-channel survey, otherwise the survey itself.
    ///
    /// # Errors
    /// Returns `GprError::InvalidParameter` when the survey was already
    /// reduced to the other band.
    pub fn prepare(&self, survey: &RadarSurvey) -> Result<RadarSurvey> {
        match (self.config.channel, survey.active_channel()) {
            (Some(channel), Some(active)) if active != channel => {
                Err(GprError::InvalidParameter(format!(
                    "channel {:?} requested but survey holds channel {:?} only",
                    channel, active
                )))
            }
            (Some(channel), None) if survey.dual_channel() => survey.select_channel(channel),
            (Some(channel), _) if !survey.dual_channel() => {
                log::debug!(
                    "Channel {:?} requested for a single-channel survey, using all samples",
                    channel
                );
                Ok(survey.clone())
            }
            _ => Ok(survey.clone()),
        }
    }

    /// Process a survey's amplitudes. `position` is the survey's index in
    /// its batch and only matters for alternate flipping.
    pub fn process(&self, survey: &RadarSurvey, position: usize) -> Result<Array2<f64>> {
        let survey = self.prepare(survey)?;
        self.process_matrix(survey.amplitudes(), position)
    }

    pub fn process_matrix(&self, matrix: &Array2<f64>, position: usize) -> Result<Array2<f64>> {
        let mut out = match self.config.rows {
            Some(rows) => select_rows(matrix, rows.start, rows.end)?,
            None => matrix.clone(),
        };

        if let Some(dewow) = self.config.dewow {
            out = dewow_with_window(&out, dewow.window)?;
        }
        if let Some(lowpass) = &self.lowpass {
            out = lowpass.apply(&out)?;
        }
        if let Some(window) = self.config.mean_trace_window {
            out = subtract_mean_trace(&out, window)?;
        }
        if self.config.flip_alternate && position % 2 == 1 {
            out = horizontal_flip(&out);
        }
        if self.config.flip {
            out = horizontal_flip(&out);
        }
        if self.config.gain != GainParams::default() {
            out = apply_gain(&out, &self.config.gain);
        }
        if let Some(target) = self.config.pad_to {
            if target > out.ncols() {
                out = pad_traces(&out, target)?;
            } else {
                log::debug!(
                    "Not padding: {} traces already >= target {}",
                    out.ncols(),
                    target
                );
            }
        }
        Ok(out)
    }
}

/// One decoded and processed file of a batch
#[derive(Debug, Clone)]
pub struct ProcessedSurvey {
    pub path: PathBuf,
    pub survey: RadarSurvey,
    pub amplitudes: Array2<f64>,
}

/// Decode and process every file. Failures are logged and returned in place;
/// they never stop the batch.
pub fn process_batch<P: AsRef<Path>>(
    paths: &[P],
    processor: &SurveyProcessor,
) -> Vec<Result<ProcessedSurvey>> {
    paths
        .iter()
        .enumerate()
        .map(|(position, path)| {
            let path = path.as_ref();
            let result = format::decode(path).and_then(|survey| {
                let survey = processor.prepare(&survey)?;
                let amplitudes = processor.process(&survey, position)?;
                Ok(ProcessedSurvey {
                    path: path.to_path_buf(),
                    survey,
                    amplitudes,
                })
            });
            if let Err(e) = &result {
                log::error!("{}: {}", path.display(), e);
            }
            result
        })
        .collect()
}

/// Largest trace count among the files, for equalising a batch with
/// `pad_to`. Undecodable files are skipped.
pub fn max_trace_count<P: AsRef<Path>>(paths: &[P]) -> Option<usize> {
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            match format::decode(path) {
                Ok(survey) => Some(survey.trace_count()),
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DewowConfig, LowPassConfig, RowWindow};
    use crate::format::SurveyFormat;
    use crate::survey::{Channel, SurveyMetadata};
    use approx::assert_abs_diff_eq;

    fn metadata(dual_channel: bool) -> SurveyMetadata {
        SurveyMetadata {
            format: SurveyFormat::Rd3,
            max_distance_m: 10.0,
            max_time_ns: 100.0,
            acquisition_step: 0.1,
            antenna_label: "test".to_string(),
            dual_channel,
            acquired_at: None,
        }
    }

    fn ramp(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| (i * 10 + j) as f64)
    }

    #[test]
    fn test_identity_config() {
        let processor = SurveyProcessor::new(ProcessingConfig::default()).unwrap();
        let matrix = ramp(20, 5);
        assert_eq!(processor.process_matrix(&matrix, 0).unwrap(), matrix);
    }

    #[test]
    fn test_rejects_bad_config_up_front() {
        let config = ProcessingConfig {
            dewow: Some(DewowConfig { window: 0 }),
            ..Default::default()
        };
        assert!(SurveyProcessor::new(config).is_err());

        let config = ProcessingConfig {
            rows: Some(RowWindow { start: 5, end: 5 }),
            ..Default::default()
        };
        assert!(matches!(
            SurveyProcessor::new(config),
            Err(GprError::InvalidRange(_))
        ));

        let config = ProcessingConfig {
            low_pass: Some(LowPassConfig {
                cutoff_hz: 600.0,
                sampling_hz: 1000.0,
                order: 4,
            }),
            ..Default::default()
        };
        assert!(matches!(
            SurveyProcessor::new(config),
            Err(GprError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_trim_before_gain() {
        let config = ProcessingConfig {
            rows: Some(RowWindow { start: 2, end: 6 }),
            gain: GainParams {
                gain_lin: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        let matrix = Array2::from_elem((10, 1), 1.0);
        let out = processor.process_matrix(&matrix, 0).unwrap();
        // Gain rows count from the trimmed start
        let column: Vec<f64> = out.column(0).to_vec();
        assert_eq!(column, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_alternate_flip_uses_position() {
        let config = ProcessingConfig {
            flip_alternate: true,
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        let matrix = ramp(3, 4);
        assert_eq!(processor.process_matrix(&matrix, 0).unwrap(), matrix);
        assert_eq!(
            processor.process_matrix(&matrix, 1).unwrap(),
            horizontal_flip(&matrix)
        );
    }

    #[test]
    fn test_flip_and_alternate_cancel() {
        let config = ProcessingConfig {
            flip: true,
            flip_alternate: true,
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        let matrix = ramp(3, 4);
        assert_eq!(processor.process_matrix(&matrix, 3).unwrap(), matrix);
    }

    #[test]
    fn test_pads_only_narrower() {
        let config = ProcessingConfig {
            pad_to: Some(6),
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        assert_eq!(processor.process_matrix(&ramp(4, 4), 0).unwrap().ncols(), 6);
        assert_eq!(processor.process_matrix(&ramp(4, 9), 0).unwrap().ncols(), 9);
    }

    #[test]
    fn test_mean_trace_window_checked_per_survey() {
        let config = ProcessingConfig {
            mean_trace_window: Some(10),
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        assert!(processor.process_matrix(&ramp(4, 12), 0).is_ok());
        assert!(matches!(
            processor.process_matrix(&ramp(4, 5), 0),
            Err(GprError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_full_pipeline_keeps_input() {
        let config = ProcessingConfig {
            dewow: Some(DewowConfig::default()),
            low_pass: Some(LowPassConfig {
                cutoff_hz: 100.0,
                sampling_hz: 1000.0,
                order: 4,
            }),
            mean_trace_window: Some(3),
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();
        let survey = RadarSurvey::new(metadata(false), ramp(64, 6)).unwrap();
        let before = survey.amplitudes().clone();
        let out = processor.process(&survey, 0).unwrap();
        assert_eq!(out.dim(), (64, 6));
        assert_eq!(survey.amplitudes(), &before);
        // Columns of a ramp differ by a constant which the mean trace removes
        for row in out.rows() {
            assert_abs_diff_eq!(row[0] + row[2], 2.0 * row[1], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_channel_selection() {
        let config = ProcessingConfig {
            channel: Some(Channel::B),
            ..Default::default()
        };
        let processor = SurveyProcessor::new(config).unwrap();

        let dual = RadarSurvey::new(metadata(true), ramp(2048, 2)).unwrap();
        let out = processor.process(&dual, 0).unwrap();
        assert_eq!(out.nrows(), 1021);
        assert_eq!(out[[0, 0]], 10250.0);

        // Already reduced to one band: processed as is
        let band = processor.prepare(&dual).unwrap();
        assert_eq!(band.active_channel(), Some(Channel::B));
        assert_eq!(processor.process(&band, 0).unwrap(), out);

        let single = RadarSurvey::new(metadata(false), ramp(32, 2)).unwrap();
        assert_eq!(processor.process(&single, 0).unwrap().nrows(), 32);

        // Reduced to the other band: never substituted
        let band_a = dual.select_channel(Channel::A).unwrap();
        assert!(matches!(
            processor.prepare(&band_a),
            Err(GprError::InvalidParameter(_))
        ));
        assert!(processor.process(&band_a, 0).is_err());
    }

    #[test]
    fn test_batch_reports_each_file() {
        let processor = SurveyProcessor::new(ProcessingConfig::default()).unwrap();
        let results = process_batch(&["/nonexistent/a.rd3", "notes.txt"], &processor);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_err()));
        assert_eq!(max_trace_count(&["/nonexistent/a.dzt"]), None);
    }
}
