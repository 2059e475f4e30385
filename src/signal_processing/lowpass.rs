use iir_filters::filter::{DirectForm2Transposed, Filter};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::zpk2sos;
use ndarray::{Array2, ArrayView1};

use crate::error::{GprError, Result};

/// Butterworth order used by [`low_pass`]; the forward-backward pass doubles
/// the effective attenuation.
pub const DEFAULT_LOW_PASS_ORDER: usize = 4;

/// Highest Butterworth order accepted by [`low_pass_with_order`].
pub const MAX_LOW_PASS_ORDER: usize = 8;

/// Zero-phase Butterworth low-pass filter applied to each trace.
///
/// # Arguments
/// * `cutoff_hz` - Cutoff frequency, `0 < cutoff_hz < sampling_hz / 2`
/// * `sampling_hz` - Sampling frequency along the trace
///
/// # Errors
/// Returns `GprError::InvalidParameter` for a cutoff outside the open
/// interval `(0, sampling_hz / 2)`.
pub fn low_pass(matrix: &Array2<f64>, cutoff_hz: f64, sampling_hz: f64) -> Result<Array2<f64>> {
    low_pass_with_order(matrix, cutoff_hz, sampling_hz, DEFAULT_LOW_PASS_ORDER)
}

pub fn low_pass_with_order(
    matrix: &Array2<f64>,
    cutoff_hz: f64,
    sampling_hz: f64,
    order: usize,
) -> Result<Array2<f64>> {
    ZeroPhaseLowpass::new(cutoff_hz, sampling_hz, order)?.apply(matrix)
}

/// Butterworth low-pass run forward then backward over a whole trace
///
/// The two passes cancel each other's phase response so reflectors stay at
/// their sample positions. Edges are padded with an odd reflection of the
/// trace, and each pass starts in the steady state of its first sample, so a
/// constant trace comes out unchanged.
#[derive(Debug, Clone)]
pub struct ZeroPhaseLowpass {
    cutoff_hz: f64,
    sampling_hz: f64,
    order: usize,
}

impl ZeroPhaseLowpass {
    pub fn new(cutoff_hz: f64, sampling_hz: f64, order: usize) -> Result<Self> {
        if !(sampling_hz.is_finite() && sampling_hz > 0.0) {
            return Err(GprError::InvalidParameter(format!(
                "sampling frequency must be > 0 Hz, got {}",
                sampling_hz
            )));
        }
        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0 && cutoff_hz < sampling_hz / 2.0) {
            return Err(GprError::InvalidParameter(format!(
                "cutoff must lie in (0, {}) Hz, got {}",
                sampling_hz / 2.0,
                cutoff_hz
            )));
        }
        if order == 0 || order > MAX_LOW_PASS_ORDER {
            return Err(GprError::InvalidParameter(format!(
                "filter order must be 1..={}, got {}",
                MAX_LOW_PASS_ORDER, order
            )));
        }
        let lowpass = Self {
            cutoff_hz,
            sampling_hz,
            order,
        };
        // Fail on construction rather than on the first trace
        lowpass.design()?;
        Ok(lowpass)
    }

    fn design(&self) -> Result<DirectForm2Transposed> {
        let zpk = butter(
            self.order as u32,
            FilterType::LowPass(self.cutoff_hz),
            self.sampling_hz,
        )
        .map_err(|e| GprError::FilterDesign(format!("{:?}", e)))?;

        let sos = zpk2sos(&zpk, None).map_err(|e| GprError::FilterDesign(format!("{:?}", e)))?;

        Ok(DirectForm2Transposed::new(&sos))
    }

    /// Filter every trace (column) of `matrix`.
    pub fn apply(&self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        let mut out = matrix.clone();
        for mut column in out.columns_mut() {
            let filtered = self.filtfilt(&column.to_vec())?;
            column.assign(&ArrayView1::from(filtered.as_slice()));
        }
        Ok(out)
    }

    /// Samples of odd-reflected padding added at each end.
    pub fn pad_len(&self, trace_len: usize) -> usize {
        (3 * (2 * self.order + 1)).min(trace_len.saturating_sub(1))
    }

    pub fn filtfilt(&self, trace: &[f64]) -> Result<Vec<f64>> {
        if trace.is_empty() {
            return Ok(Vec::new());
        }
        let pad = self.pad_len(trace.len());
        let mut padded = odd_extend(trace, pad);

        self.run_pass(&mut padded)?;
        padded.reverse();
        self.run_pass(&mut padded)?;
        padded.reverse();

        Ok(padded[pad..pad + trace.len()].to_vec())
    }

    /// One causal pass, filtered relative to the first sample. The Butterworth
    /// low-pass has unity DC gain, so this equals starting the filter from the
    /// steady state for that sample.
    fn run_pass(&self, samples: &mut [f64]) -> Result<()> {
        let Some(&initial) = samples.first() else {
            return Ok(());
        };
        let mut filter = self.design()?;
        for sample in samples.iter_mut() {
            *sample = filter.filter(*sample - initial) + initial;
        }
        Ok(())
    }
}

/// `2*x[0] - x[pad..0]`, then `x`, then `2*x[n-1] - x[n-2..n-2-pad]`.
fn odd_extend(trace: &[f64], pad: usize) -> Vec<f64> {
    let n = trace.len();
    let first = trace[0];
    let last = trace[n - 1];
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - trace[i]));
    out.extend_from_slice(trace);
    out.extend((1..=pad).map(|i| 2.0 * last - trace[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn rms(values: &[f64]) -> f64 {
        (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
    }

    fn sine(freq: f64, sampling: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sampling).sin())
            .collect()
    }

    #[test]
    fn test_rejects_cutoff_outside_band() {
        let matrix = Array2::zeros((16, 2));
        let cases = [(0.0, 1000.0), (-5.0, 1000.0), (500.0, 1000.0), (800.0, 1000.0)];
        for (cutoff, sampling) in cases {
            assert!(matches!(
                low_pass(&matrix, cutoff, sampling),
                Err(GprError::InvalidParameter(_))
            ));
        }
        assert!(low_pass(&matrix, 100.0, 0.0).is_err());
    }

    #[test]
    fn test_constant_trace_unchanged() {
        let matrix = Array2::from_elem((512, 1), 1000.0);
        for (cutoff, sampling) in [(100e6, 5.12e9), (51.2e6, 5.12e9), (10.0, 1000.0)] {
            let out = low_pass(&matrix, cutoff, sampling).unwrap();
            for (row, value) in out.column(0).iter().enumerate() {
                assert!(
                    (value - 1000.0).abs() < 1e-6,
                    "cutoff {} Hz: row {} = {}",
                    cutoff,
                    row,
                    value
                );
            }
        }
    }

    #[test]
    fn test_offset_does_not_ring_at_ends() {
        let sampling = 5.12e9;
        let filter = ZeroPhaseLowpass::new(100e6, sampling, DEFAULT_LOW_PASS_ORDER).unwrap();
        let slow = sine(10e6, sampling, 512);
        let offset: Vec<f64> = slow.iter().map(|v| v + 500.0).collect();
        let plain = filter.filtfilt(&slow).unwrap();
        let shifted = filter.filtfilt(&offset).unwrap();
        for (row, (a, b)) in plain.iter().zip(&shifted).enumerate() {
            assert!((b - a - 500.0).abs() < 1e-6, "row {}: {} vs {}", row, a, b);
        }
    }

    #[test]
    fn test_odd_extend() {
        let out = odd_extend(&[1.0, 2.0, 4.0], 2);
        assert_eq!(out, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 6.0, 7.0]);
    }

    #[test]
    fn test_passes_low_and_attenuates_high() {
        let sampling = 1000.0;
        let filter = ZeroPhaseLowpass::new(50.0, sampling, DEFAULT_LOW_PASS_ORDER).unwrap();

        let low = sine(5.0, sampling, 2000);
        let low_out = filter.filtfilt(&low).unwrap();
        let ratio = rms(&low_out[200..1800]) / rms(&low[200..1800]);
        assert!(ratio > 0.95, "passband attenuated: {}", ratio);

        let high = sine(300.0, sampling, 2000);
        let high_out = filter.filtfilt(&high).unwrap();
        let ratio = rms(&high_out[200..1800]) / rms(&high[200..1800]);
        assert!(ratio < 0.01, "stopband leaked: {}", ratio);
    }

    #[test]
    fn test_zero_phase_keeps_peak_position() {
        let sampling = 1000.0;
        let filter = ZeroPhaseLowpass::new(100.0, sampling, DEFAULT_LOW_PASS_ORDER).unwrap();
        let trace: Vec<f64> = (0..400)
            .map(|i| (-((i as f64 - 200.0) / 6.0).powi(2)).exp())
            .collect();
        let out = filter.filtfilt(&trace).unwrap();
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 200);
    }

    #[test]
    fn test_preserves_shape() {
        let matrix = Array2::from_shape_fn((128, 5), |(i, j)| (i + j) as f64);
        let out = low_pass(&matrix, 40.0, 1000.0).unwrap();
        assert_eq!(out.dim(), (128, 5));
    }

    #[test]
    fn test_tiny_traces() {
        let filter = ZeroPhaseLowpass::new(40.0, 1000.0, 2).unwrap();
        assert!(filter.filtfilt(&[]).unwrap().is_empty());
        assert_eq!(filter.filtfilt(&[3.0]).unwrap().len(), 1);
    }
}
