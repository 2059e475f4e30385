//! Survey file decoders.
//!
//! One decoder per device format, all producing a [`RadarSurvey`]. The
//! format is chosen from the file extension.

mod dzt;
mod mala;
pub mod rad_header;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use dzt::{DztDecoder, DztHeader, pack_datetime};
pub use mala::MalaDecoder;

use crate::error::{FormatError, Result};
use crate::survey::{Channel, RadarSurvey};

/// Supported survey file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyFormat {
    /// MALÅ RAMAC, 32-bit samples
    Rd7,
    /// MALÅ RAMAC, 16-bit samples
    Rd3,
    /// GSSI
    Dzt,
}

impl SurveyFormat {
    pub const ALL: [SurveyFormat; 3] = [SurveyFormat::Rd7, SurveyFormat::Rd3, SurveyFormat::Dzt];

    /// Match the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> std::result::Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| FormatError::UnsupportedFormat(path.display().to_string()))?;

        Self::ALL
            .into_iter()
            .find(|format| format.extension() == ext)
            .ok_or_else(|| FormatError::UnsupportedFormat(format!(".{}", ext)))
    }

    pub fn extension(self) -> &'static str {
        match self {
            SurveyFormat::Rd7 => "rd7",
            SurveyFormat::Rd3 => "rd3",
            SurveyFormat::Dzt => "dzt",
        }
    }
}

impl fmt::Display for SurveyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_ascii_uppercase())
    }
}

/// Decoder for one survey format
pub enum FormatDecoder {
    Rd7(MalaDecoder),
    Rd3(MalaDecoder),
    Dzt(DztDecoder),
}

impl FormatDecoder {
    pub fn new(format: SurveyFormat) -> Self {
        match format {
            SurveyFormat::Rd7 => Self::Rd7(MalaDecoder::rd7()),
            SurveyFormat::Rd3 => Self::Rd3(MalaDecoder::rd3()),
            SurveyFormat::Dzt => Self::Dzt(DztDecoder::new()),
        }
    }

    pub fn for_path(path: &Path) -> Result<Self> {
        Ok(Self::new(SurveyFormat::from_path(path)?))
    }

    pub fn format(&self) -> SurveyFormat {
        match self {
            Self::Rd7(_) => SurveyFormat::Rd7,
            Self::Rd3(_) => SurveyFormat::Rd3,
            Self::Dzt(_) => SurveyFormat::Dzt,
        }
    }

    /// Read and decode the whole file at `path`.
    pub fn decode(&self, path: &Path) -> Result<RadarSurvey> {
        let survey = match self {
            Self::Rd7(decoder) | Self::Rd3(decoder) => decoder.decode(path)?,
            Self::Dzt(decoder) => decoder.decode(path)?,
        };
        log::info!(
            "Decoded {} ({}): {} traces x {} samples, {:.1} ns, antenna '{}'",
            path.display(),
            self.format(),
            survey.trace_count(),
            survey.sample_count(),
            survey.max_time_ns(),
            survey.antenna_label()
        );
        Ok(survey)
    }
}

/// Decode a survey file, choosing the format from its extension.
///
/// # Errors
/// `FormatError::UnsupportedFormat` for an unknown extension,
/// `FormatError::FileNotFound` when the file (or its header sidecar) is
/// missing, `FormatError::TruncatedFile` or `FormatError::CorruptHeader`
/// when the content does not match its header.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<RadarSurvey> {
    let path = path.as_ref();
    FormatDecoder::for_path(path)?.decode(path)
}

/// Decode a dual-channel survey and keep one band.
pub fn decode_channel<P: AsRef<Path>>(path: P, channel: Channel) -> Result<RadarSurvey> {
    decode(path)?.select_channel(channel)
}

/// Whole-file read mapping a missing file to `FileNotFound`.
pub(crate) fn read_file(path: &Path) -> std::result::Result<Vec<u8>, FormatError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FormatError::FileNotFound(path.to_path_buf()),
        _ => FormatError::Io(e),
    })
}
