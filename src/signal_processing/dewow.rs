use ndarray::{Array2, ArrayView1};

use crate::error::{GprError, Result};

/// Running-mean window used by [`dewow`], in samples.
pub const DEFAULT_DEWOW_WINDOW: usize = 9;

/// Remove low-frequency baseline drift ("wow") from every trace.
///
/// Each trace has its centred running mean over [`DEFAULT_DEWOW_WINDOW`]
/// samples subtracted. Traces shorter than the window are returned unchanged.
pub fn dewow(matrix: &Array2<f64>) -> Array2<f64> {
    let mut out = matrix.clone();
    subtract_running_mean(&mut out, DEFAULT_DEWOW_WINDOW);
    out
}

/// [`dewow`] with an explicit window length.
///
/// # Errors
/// `GprError::InvalidParameter` if `window` is 0.
pub fn dewow_with_window(matrix: &Array2<f64>, window: usize) -> Result<Array2<f64>> {
    if window == 0 {
        return Err(GprError::InvalidParameter(
            "dewow window must be at least 1 sample".to_string(),
        ));
    }
    let mut out = matrix.clone();
    subtract_running_mean(&mut out, window);
    Ok(out)
}

fn subtract_running_mean(matrix: &mut Array2<f64>, window: usize) {
    if matrix.nrows() < window {
        log::debug!(
            "dewow skipped: {} samples per trace, window {}",
            matrix.nrows(),
            window
        );
        return;
    }
    for mut column in matrix.columns_mut() {
        let trace = column.to_vec();
        let baseline = centred_running_mean(&trace, window);
        column -= &ArrayView1::from(baseline.as_slice());
    }
}

/// Mean of the `window` samples centred on each position; the window is
/// truncated at both ends of the trace.
pub fn centred_running_mean(trace: &[f64], window: usize) -> Vec<f64> {
    let n = trace.len();
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut sum = 0.0;
    for &v in trace {
        sum += v;
        prefix.push(sum);
    }

    let before = (window - 1) / 2;
    let after = window - 1 - before;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(n);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}
