pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod output;
pub mod processing;
pub mod signal_processing;
pub mod survey;
pub mod units;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{ProcessingConfig, RelativePermittivity};
pub use error::{FormatError, GprError, Result};
pub use format::{SurveyFormat, decode, decode_channel};
pub use processing::SurveyProcessor;
pub use survey::{Channel, RadarSurvey, SurveyMetadata};
pub use units::{UnitConverter, depth_max};
