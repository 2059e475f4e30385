use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array2;

use super::{SurveyFormat, read_file};
use crate::constants::{DZT_HEADER_BLOCK, DZT_MAX_CHANNELS};
use crate::error::{FormatError, Result};
use crate::survey::{RadarSurvey, SurveyMetadata};

/// Fields of the first GSSI header block used by the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct DztHeader {
    pub tag: u16,
    /// Offset field; see [`DztHeader::data_offset`]
    pub data: u16,
    pub samples: usize,
    pub bits: u16,
    pub scans_per_second: f32,
    pub scans_per_meter: f32,
    /// Two-way time range in ns
    pub range_ns: f32,
    pub created: Option<NaiveDateTime>,
    pub channels: usize,
    pub permittivity: f32,
    pub antenna: String,
}

impl DztHeader {
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, FormatError> {
        if bytes.len() < DZT_HEADER_BLOCK {
            return Err(FormatError::TruncatedFile {
                declared: DZT_HEADER_BLOCK as u64,
                actual: bytes.len() as u64,
            });
        }

        let header = Self {
            tag: u16_at(bytes, 0),
            data: u16_at(bytes, 2),
            samples: u16_at(bytes, 4) as usize,
            bits: u16_at(bytes, 6),
            scans_per_second: f32_at(bytes, 10),
            scans_per_meter: f32_at(bytes, 14),
            range_ns: f32_at(bytes, 26),
            created: packed_datetime(u32_at(bytes, 32)),
            channels: u16_at(bytes, 52) as usize,
            permittivity: f32_at(bytes, 54),
            antenna: text_at(bytes, 98, 14),
        };
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> std::result::Result<(), FormatError> {
        if self.tag & 0x00ff != 0x00ff {
            return Err(FormatError::CorruptHeader(format!(
                "bad header tag 0x{:04x}",
                self.tag
            )));
        }
        if self.samples == 0 {
            return Err(FormatError::CorruptHeader("0 samples per scan".to_string()));
        }
        if !matches!(self.bits, 8 | 16 | 32) {
            return Err(FormatError::CorruptHeader(format!(
                "unsupported word size: {} bits",
                self.bits
            )));
        }
        if self.channels == 0 || self.channels > DZT_MAX_CHANNELS {
            return Err(FormatError::CorruptHeader(format!(
                "invalid channel count {}",
                self.channels
            )));
        }
        if !(self.range_ns.is_finite() && self.range_ns > 0.0) {
            return Err(FormatError::CorruptHeader(format!(
                "time range must be > 0 ns, got {}",
                self.range_ns
            )));
        }
        let sps_ok = self.scans_per_second.is_finite() && self.scans_per_second >= 0.0;
        let spm_ok = self.scans_per_meter.is_finite() && self.scans_per_meter >= 0.0;
        if !sps_ok || !spm_ok {
            return Err(FormatError::CorruptHeader(format!(
                "invalid scan rates: {} scans/s, {} scans/m",
                self.scans_per_second, self.scans_per_meter
            )));
        }
        Ok(())
    }

    /// Byte offset of the first scan.
    pub fn data_offset(&self) -> usize {
        let data = self.data as usize;
        if data > 0 && data < DZT_HEADER_BLOCK {
            DZT_HEADER_BLOCK * data
        } else {
            DZT_HEADER_BLOCK * self.channels
        }
    }

    pub fn sample_width(&self) -> usize {
        self.bits as usize / 8
    }
}

/// Decoder for GSSI `.dzt` files
///
/// Scans of all channels are interleaved after the header blocks; only the
/// first channel is decoded.
#[derive(Default)]
pub struct DztDecoder;

impl DztDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, path: &Path) -> Result<RadarSurvey> {
        let bytes = read_file(path)?;
        self.decode_bytes(&bytes)
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<RadarSurvey> {
        let header = DztHeader::parse(bytes)?;
        log::debug!("DZT header: {:?}", header);

        let offset = header.data_offset();
        let width = header.sample_width();
        let trace_bytes = header.samples * width;
        let scan_bytes = trace_bytes * header.channels;

        let payload = bytes.len().saturating_sub(offset);
        let traces = payload / scan_bytes;
        if traces == 0 || payload % scan_bytes != 0 {
            return Err(FormatError::TruncatedFile {
                declared: (offset + (traces + 1) * scan_bytes) as u64,
                actual: bytes.len() as u64,
            }
            .into());
        }
        if header.channels > 1 {
            log::warn!(
                "DZT file has {} channels; decoding channel 0 only",
                header.channels
            );
        }

        let acquisition_step = if header.scans_per_second > 0.0 {
            1.0 / header.scans_per_second as f64
        } else if header.scans_per_meter > 0.0 {
            1.0 / header.scans_per_meter as f64
        } else {
            return Err(FormatError::CorruptHeader(
                "neither scans per second nor scans per meter is positive".to_string(),
            )
            .into());
        };
        let max_distance_m = if header.scans_per_meter > 0.0 {
            traces as f64 / header.scans_per_meter as f64
        } else {
            0.0
        };

        let data = &bytes[offset..];
        let amplitudes = Array2::from_shape_fn((header.samples, traces), |(row, trace)| {
            let at = trace * scan_bytes + row * width;
            sample_at(&data[at..at + width], header.bits)
        });

        let metadata = SurveyMetadata {
            format: SurveyFormat::Dzt,
            max_distance_m,
            max_time_ns: header.range_ns as f64,
            acquisition_step,
            antenna_label: header.antenna.clone(),
            dual_channel: false,
            acquired_at: header.created,
        };
        RadarSurvey::new(metadata, amplitudes)
    }
}

/// 8- and 16-bit words are unsigned and re-centred at mid-scale; 32-bit
/// words are signed.
fn sample_at(word: &[u8], bits: u16) -> f64 {
    match bits {
        8 => word[0] as f64 - 128.0,
        16 => u16::from_le_bytes([word[0], word[1]]) as f64 - 32768.0,
        _ => i32::from_le_bytes([word[0], word[1], word[2], word[3]]) as f64,
    }
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_bits(u32_at(bytes, at))
}

fn text_at(bytes: &[u8], at: usize, len: usize) -> String {
    String::from_utf8_lossy(&bytes[at..at + len])
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// GSSI packed date: 2-second units, minutes, hours, day, month, years
/// since 1980, from the least significant bit up.
fn packed_datetime(value: u32) -> Option<NaiveDateTime> {
    if value == 0 {
        return None;
    }
    let sec = (value & 0x1f) * 2;
    let min = (value >> 5) & 0x3f;
    let hour = (value >> 11) & 0x1f;
    let day = (value >> 16) & 0x1f;
    let month = (value >> 21) & 0x0f;
    let year = ((value >> 25) & 0x7f) as i32 + 1980;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, min, sec)
}

/// Inverse of `packed_datetime`, for writers.
pub fn pack_datetime(at: &NaiveDateTime) -> u32 {
    use chrono::{Datelike, Timelike};
    let year = (at.year() - 1980).clamp(0, 0x7f) as u32;
    (at.second() / 2)
        | (at.minute() << 5)
        | (at.hour() << 11)
        | (at.day() << 16)
        | (at.month() << 21)
        | (year << 25)
}
