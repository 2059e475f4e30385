use ndarray::{Array2, s};

use crate::error::{GprError, Result};

/// Keep rows `[row_start, row_end)`.
///
/// # Errors
/// `GprError::InvalidRange` unless `row_start < row_end <= sample_count`.
pub fn select_rows(matrix: &Array2<f64>, row_start: usize, row_end: usize) -> Result<Array2<f64>> {
    if row_start >= row_end || row_end > matrix.nrows() {
        return Err(GprError::InvalidRange(format!(
            "rows [{}, {}) outside [0, {})",
            row_start,
            row_end,
            matrix.nrows()
        )));
    }
    Ok(matrix.slice(s![row_start..row_end, ..]).to_owned())
}

/// Reverse the trace order, e.g. for lines surveyed in the opposite direction.
pub fn horizontal_flip(matrix: &Array2<f64>) -> Array2<f64> {
    matrix.slice(s![.., ..;-1]).to_owned()
}

/// Append zero traces until the matrix has `target_trace_count` columns.
///
/// # Errors
/// `GprError::InvalidParameter` if the matrix already has more traces.
pub fn pad_traces(matrix: &Array2<f64>, target_trace_count: usize) -> Result<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    if target_trace_count < cols {
        return Err(GprError::InvalidParameter(format!(
            "cannot pad {} traces down to {}",
            cols, target_trace_count
        )));
    }
    let mut out = Array2::zeros((rows, target_trace_count));
    out.slice_mut(s![.., ..cols]).assign(matrix);
    Ok(out)
}
