#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;
use radargram::format::SurveyFormat;
use radargram::simulation::{
    DztOptions, MalaHeader, SyntheticSurveyConfig, generate_radargram, write_dzt, write_mala,
};

pub const TIME_WINDOW_NS: f64 = 100.0;

/// Seeded radargram with every artefact enabled, rounded so it survives
/// integer sample formats unchanged.
pub fn synthetic(samples: usize, traces: usize, seed: u64) -> Array2<f64> {
    let config = SyntheticSurveyConfig::default()
        .with_size(samples, traces)
        .with_seed(seed);
    generate_radargram(&config)
        .expect("valid synthetic config")
        .mapv(f64::round)
}

pub fn mala_header() -> MalaHeader {
    MalaHeader {
        time_window_ns: TIME_WINDOW_NS,
        ..Default::default()
    }
}

pub fn dzt_options(bits: u16) -> DztOptions {
    DztOptions {
        bits,
        range_ns: TIME_WINDOW_NS as f32,
        ..Default::default()
    }
}

/// Write `amplitudes` as `name` with the extension of `format`.
pub fn write_survey(
    dir: &Path,
    name: &str,
    format: SurveyFormat,
    amplitudes: &Array2<f64>,
) -> PathBuf {
    let path = dir.join(format!("{}.{}", name, format.extension()));
    match format {
        SurveyFormat::Dzt => write_dzt(&path, amplitudes, &dzt_options(32)),
        _ => write_mala(&path, format, amplitudes, &mala_header()),
    }
    .expect("write survey");
    path
}
