use std::path::{Path, PathBuf};

use ndarray::Array2;

use super::rad_header::RadHeader;
use super::{SurveyFormat, read_file};
use crate::constants::DUAL_CHANNEL_B;
use crate::error::{FormatError, Result};
use crate::survey::{RadarSurvey, SurveyMetadata};

/// Marker in the antenna label of dual-channel RAMAC antennas.
const DUAL_CHANNEL_MARKER: &str = "flex";

/// Decoder for MALÅ RAMAC `.rd3` (16-bit) and `.rd7` (32-bit) files
///
/// Samples are little-endian signed integers stored trace after trace.
/// The header lives in a `.rad` file with the same stem.
pub struct MalaDecoder {
    format: SurveyFormat,
    sample_width: usize,
}

impl MalaDecoder {
    pub fn rd3() -> Self {
        Self {
            format: SurveyFormat::Rd3,
            sample_width: 2,
        }
    }

    pub fn rd7() -> Self {
        Self {
            format: SurveyFormat::Rd7,
            sample_width: 4,
        }
    }

    pub fn sample_width(&self) -> usize {
        self.sample_width
    }

    pub fn decode(&self, path: &Path) -> Result<RadarSurvey> {
        let data = read_file(path)?;
        let header_path = header_path(path);
        let header_bytes = read_file(&header_path)?;
        let header: RadHeader = String::from_utf8_lossy(&header_bytes).parse()?;
        log::debug!("{}: {:?}", header_path.display(), header);

        self.decode_parts(&header, &data)
    }

    pub fn decode_parts(&self, header: &RadHeader, data: &[u8]) -> Result<RadarSurvey> {
        let (samples, traces) = (header.samples, header.last_trace);

        let declared = samples
            .checked_mul(traces)
            .and_then(|n| n.checked_mul(self.sample_width))
            .ok_or_else(|| {
                FormatError::CorruptHeader(format!(
                    "{} traces x {} samples overflows",
                    traces, samples
                ))
            })?;
        if data.len() < declared {
            return Err(FormatError::TruncatedFile {
                declared: declared as u64,
                actual: data.len() as u64,
            }
            .into());
        }
        if data.len() > declared {
            log::warn!(
                "Ignoring {} bytes after the declared {} traces",
                data.len() - declared,
                traces
            );
        }

        let dual_channel = header
            .antenna
            .to_ascii_lowercase()
            .contains(DUAL_CHANNEL_MARKER);
        if dual_channel && samples < DUAL_CHANNEL_B.end {
            return Err(FormatError::CorruptHeader(format!(
                "dual-channel antenna '{}' with only {} samples",
                header.antenna, samples
            ))
            .into());
        }

        let acquisition_step = if header.time_interval_s > 0.0 {
            header.time_interval_s
        } else if header.distance_interval_m > 0.0 {
            header.distance_interval_m
        } else {
            return Err(FormatError::CorruptHeader(
                "neither TIME INTERVAL nor DISTANCE INTERVAL is positive".to_string(),
            )
            .into());
        };

        let values = self.decode_samples(&data[..declared]);
        let amplitudes = Array2::from_shape_fn((samples, traces), |(row, trace)| {
            values[trace * samples + row]
        });

        let metadata = SurveyMetadata {
            format: self.format,
            max_distance_m: traces as f64 * header.distance_interval_m,
            max_time_ns: header.time_window_ns,
            acquisition_step,
            antenna_label: header.antenna.clone(),
            dual_channel,
            acquired_at: None,
        };
        RadarSurvey::new(metadata, amplitudes)
    }

    fn decode_samples(&self, data: &[u8]) -> Vec<f64> {
        match self.sample_width {
            2 => data
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as f64)
                .collect(),
            _ => data
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                .collect(),
        }
    }
}

/// `.rad` sidecar of a data file, keeping the case style of the extension.
fn header_path(data_path: &Path) -> PathBuf {
    let upper = data_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.chars().all(|c| !c.is_ascii_lowercase()));
    let candidate = data_path.with_extension(if upper { "RAD" } else { "rad" });
    if candidate.exists() {
        candidate
    } else {
        data_path.with_extension(if upper { "rad" } else { "RAD" })
    }
}
