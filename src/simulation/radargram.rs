use std::f64::consts::PI;

use ndarray::Array2;
use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{GprError, Result};

/// Synthetic radargram description
///
/// Every trace carries the direct (air/ground) wave, the reflector
/// hyperbolas crossing it, a slow "wow" drift, ringing common to all traces
/// and Gaussian noise.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct SyntheticSurveyConfig {
    pub seed: Option<u64>,
    pub samples: usize,
    pub traces: usize,
    /// Ricker wavelet period in samples
    pub wavelet_period: f64,
    pub direct_wave_row: f64,
    pub direct_wave_amplitude: f64,
    pub reflectors: Vec<Reflector>,
    /// Peak of the low-frequency drift added to each trace
    pub wow_amplitude: f64,
    /// Amplitude of the horizontal banding shared by all traces
    pub ringing_amplitude: f64,
    pub noise_std: f64,
}

impl Default for SyntheticSurveyConfig {
    fn default() -> Self {
        Self {
            seed: None,
            samples: 512,
            traces: 200,
            wavelet_period: 16.0,
            direct_wave_row: 24.0,
            direct_wave_amplitude: 8000.0,
            reflectors: vec![
                Reflector {
                    trace: 60.0,
                    row: 150.0,
                    rows_per_trace: 1.5,
                    amplitude: 3000.0,
                },
                Reflector {
                    trace: 140.0,
                    row: 300.0,
                    rows_per_trace: 1.2,
                    amplitude: 2000.0,
                },
            ],
            wow_amplitude: 1500.0,
            ringing_amplitude: 400.0,
            noise_std: 50.0,
        }
    }
}

impl SyntheticSurveyConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, samples: usize, traces: usize) -> Self {
        self.samples = samples;
        self.traces = traces;
        self
    }

    pub fn with_noise(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    /// Disable drift, ringing and noise, leaving only the wavelets.
    pub fn clean(mut self) -> Self {
        self.wow_amplitude = 0.0;
        self.ringing_amplitude = 0.0;
        self.noise_std = 0.0;
        self
    }
}

/// Point diffractor seen as a hyperbola with its apex at (`trace`, `row`)
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Reflector {
    pub trace: f64,
    pub row: f64,
    /// Asymptotic slope of the hyperbola flanks
    pub rows_per_trace: f64,
    pub amplitude: f64,
}

impl Reflector {
    pub fn row_at(&self, trace: usize) -> f64 {
        let offset = (trace as f64 - self.trace) * self.rows_per_trace;
        (self.row * self.row + offset * offset).sqrt()
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Ricker wavelet centred on 0, `period` in samples
pub fn ricker(t: f64, period: f64) -> f64 {
    let a = (PI * t / period).powi(2);
    (1.0 - 2.0 * a) * (-a).exp()
}

/// Generate a `samples` x `traces` amplitude matrix.
pub fn generate_radargram(config: &SyntheticSurveyConfig) -> Result<Array2<f64>> {
    if config.samples == 0 || config.traces == 0 {
        return Err(GprError::InvalidParameter(format!(
            "synthetic survey must be non-empty, got {}x{}",
            config.samples, config.traces
        )));
    }
    if !(config.wavelet_period.is_finite() && config.wavelet_period > 0.0) {
        return Err(GprError::InvalidParameter(format!(
            "wavelet period must be > 0, got {}",
            config.wavelet_period
        )));
    }
    let noise = Normal::new(0.0, config.noise_std)
        .map_err(|e| GprError::InvalidParameter(format!("noise std: {}", e)))?;
    let mut rng = create_rng(config.seed);

    let ringing: Vec<f64> = (0..config.samples)
        .map(|row| {
            let t = row as f64;
            config.ringing_amplitude * (2.0 * PI * t / 7.0).sin() * (-t / 200.0).exp()
        })
        .collect();

    let mut matrix = Array2::zeros((config.samples, config.traces));
    for (trace, mut column) in matrix.columns_mut().into_iter().enumerate() {
        // Drift shape varies slowly from trace to trace
        let wow_phase = rng.random::<f64>() * 0.5;
        let rows = config.samples as f64;

        for (row, value) in column.iter_mut().enumerate() {
            let t = row as f64;
            let mut sample = config.direct_wave_amplitude
                * ricker(t - config.direct_wave_row, config.wavelet_period);
            for reflector in &config.reflectors {
                sample += reflector.amplitude
                    * ricker(t - reflector.row_at(trace), config.wavelet_period);
            }
            sample += config.wow_amplitude * (PI * (t / rows + wow_phase)).sin();
            sample += ringing[row];
            if config.noise_std > 0.0 {
                sample += noise.sample(&mut rng);
            }
            *value = sample;
        }
    }
    log::debug!(
        "Generated {}x{} radargram with {} reflectors",
        config.samples,
        config.traces,
        config.reflectors.len()
    );
    Ok(matrix)
}
