use ndarray::Array2;
use serde::Deserialize;

use crate::constants::EXP_GAIN_RAMP_SAMPLES;

/// Depth-gain compensation parameters
///
/// `gain(t) = gain_const + lin(t) + exp(t)` where, for row `t`,
/// - `lin(t) = gain_lin * (t - t0_lin)` for `t >= t0_lin`, else 0
/// - `exp(t) = gain_exp * e^(b * (t - t0_exp))` for `t >= t0_exp` and
///   `gain_exp > 0`, else 0, with `b = ln(gain_exp) / 75`
///
/// Rows are relative to the matrix the gain is applied to, so trimming
/// must happen first. Callers keep `gain_lin` and `gain_exp` non-negative;
/// nothing is clamped here.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GainParams {
    pub t0_lin: usize,
    pub t0_exp: usize,
    pub gain_const: f64,
    pub gain_lin: f64,
    pub gain_exp: f64,
}

impl Default for GainParams {
    /// Identity gain
    fn default() -> Self {
        Self {
            t0_lin: 0,
            t0_exp: 0,
            gain_const: 1.0,
            gain_lin: 0.0,
            gain_exp: 0.0,
        }
    }
}

impl GainParams {
    pub fn gain_at(&self, row: usize) -> f64 {
        let lin = if row >= self.t0_lin {
            self.gain_lin * (row - self.t0_lin) as f64
        } else {
            0.0
        };
        let exp = if row >= self.t0_exp && self.gain_exp > 0.0 {
            let b = self.gain_exp.ln() / EXP_GAIN_RAMP_SAMPLES;
            self.gain_exp * (b * (row - self.t0_exp) as f64).exp()
        } else {
            0.0
        };
        self.gain_const + lin + exp
    }
}

/// Gain factor for each of `rows` rows.
pub fn gain_curve(params: &GainParams, rows: usize) -> Vec<f64> {
    (0..rows).map(|row| params.gain_at(row)).collect()
}

/// Multiply every row of `matrix` by its gain factor.
pub fn apply_gain(matrix: &Array2<f64>, params: &GainParams) -> Array2<f64> {
    let curve = gain_curve(params, matrix.nrows());
    let mut out = matrix.clone();
    for (mut row, gain) in out.rows_mut().into_iter().zip(curve) {
        row *= gain;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linear_ramp_example() {
        let params = GainParams {
            gain_lin: 0.1,
            ..Default::default()
        };
        let trace = Array2::from_elem((4, 1), 1.0);
        let out = apply_gain(&trace, &params);
        for (v, e) in out.iter().zip([1.0, 1.1, 1.2, 1.3]) {
            assert_abs_diff_eq!(*v, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_identity_for_any_t0() {
        let matrix = Array2::from_shape_fn((50, 3), |(i, j)| i as f64 - j as f64 * 3.5);
        for (t0_lin, t0_exp) in [(0, 0), (10, 3), (49, 100), (200, 0)] {
            let params = GainParams {
                t0_lin,
                t0_exp,
                ..Default::default()
            };
            assert_eq!(apply_gain(&matrix, &params), matrix);
        }
    }

    #[test]
    fn test_zero_exp_gain_contributes_nothing() {
        let params = GainParams {
            gain_const: 2.0,
            gain_exp: 0.0,
            ..Default::default()
        };
        for v in gain_curve(&params, 300) {
            assert!(v.is_finite());
            assert_eq!(v, 2.0);
        }
    }

    #[test]
    fn test_linear_term_starts_at_t0() {
        let params = GainParams {
            t0_lin: 5,
            gain_lin: 0.5,
            ..Default::default()
        };
        let curve = gain_curve(&params, 8);
        assert_eq!(&curve[..6], &[1.0; 6]);
        assert_abs_diff_eq!(curve[7], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exponential_term_reaches_gain_after_ramp() {
        let params = GainParams {
            t0_exp: 10,
            gain_exp: 4.0,
            gain_const: 1.0,
            ..Default::default()
        };
        let curve = gain_curve(&params, 200);
        assert_eq!(curve[9], 1.0);
        // At t0 the term equals gain_exp, 75 samples later gain_exp^2
        assert_abs_diff_eq!(curve[10], 1.0 + 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve[85], 1.0 + 16.0, epsilon = 1e-9);
        assert!(curve.windows(2).skip(10).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_negative_results_not_clamped() {
        let params = GainParams {
            gain_const: 1.0,
            gain_lin: -1.0,
            ..Default::default()
        };
        let curve = gain_curve(&params, 4);
        assert_abs_diff_eq!(curve[3], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gain_params_from_toml() {
        let params: GainParams = toml::from_str("gain_lin = 0.2\nt0_lin = 12\n").unwrap();
        assert_eq!(params.t0_lin, 12);
        assert_eq!(params.gain_const, 1.0);
        assert_eq!(params.gain_exp, 0.0);
    }
}
