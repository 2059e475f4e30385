//! Synthetic surveys for tests and tooling.

mod radargram;
mod writer;

pub use radargram::{Reflector, SyntheticSurveyConfig, generate_radargram, ricker};
pub use writer::{DztOptions, MalaHeader, write_dzt, write_mala};
