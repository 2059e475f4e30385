use ndarray::{Array1, Array2, Axis, s};

use crate::error::{GprError, Result};

/// Subtract the mean of the first `trace_window` traces from every trace.
///
/// Suppresses horizontal banding and antenna ringing common to all traces.
///
/// # Errors
/// `GprError::InvalidParameter` unless `0 < trace_window <= trace_count`.
pub fn subtract_mean_trace(matrix: &Array2<f64>, trace_window: usize) -> Result<Array2<f64>> {
    let mean = mean_trace(matrix, trace_window)?;
    let mut out = matrix.clone();
    for mut column in out.columns_mut() {
        column -= &mean;
    }
    Ok(out)
}

/// Sample-wise mean of the first `trace_window` traces.
pub fn mean_trace(matrix: &Array2<f64>, trace_window: usize) -> Result<Array1<f64>> {
    if trace_window == 0 || trace_window > matrix.ncols() {
        return Err(GprError::InvalidParameter(format!(
            "mean trace window must be in 1..={}, got {}",
            matrix.ncols(),
            trace_window
        )));
    }
    matrix
        .slice(s![.., ..trace_window])
        .mean_axis(Axis(1))
        .ok_or_else(|| GprError::InvalidParameter("empty mean trace window".to_string()))
}
