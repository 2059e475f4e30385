//! Writers producing files the decoders accept.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use ndarray::Array2;

use crate::constants::DZT_HEADER_BLOCK;
use crate::error::{FormatError, GprError, Result};
use crate::format::{SurveyFormat, pack_datetime};

/// `.rad` header values for [`write_mala`]
#[derive(Clone, Debug)]
pub struct MalaHeader {
    pub time_window_ns: f64,
    pub time_interval_s: f64,
    pub distance_interval_m: f64,
    pub antenna: String,
}

impl Default for MalaHeader {
    fn default() -> Self {
        Self {
            time_window_ns: 100.0,
            time_interval_s: 0.05,
            distance_interval_m: 0.02,
            antenna: "500 MHz Shielded".to_string(),
        }
    }
}

/// Write `amplitudes` as a RAMAC data file at `path` plus its `.rad`
/// sidecar. Values are rounded and saturated to the sample type.
pub fn write_mala(
    path: &Path,
    format: SurveyFormat,
    amplitudes: &Array2<f64>,
    header: &MalaHeader,
) -> Result<()> {
    let (samples, traces) = amplitudes.dim();
    let mut data = Vec::new();
    // Trace-major: iterate columns
    for column in amplitudes.columns() {
        for &value in column.iter() {
            match format {
                SurveyFormat::Rd3 => data.extend_from_slice(&(value.round() as i16).to_le_bytes()),
                SurveyFormat::Rd7 => data.extend_from_slice(&(value.round() as i32).to_le_bytes()),
                SurveyFormat::Dzt => {
                    return Err(GprError::InvalidParameter(
                        "write_mala cannot write DZT files".to_string(),
                    ));
                }
            }
        }
    }

    let frequency_mhz = samples as f64 / header.time_window_ns * 1000.0;
    let rad = format!(
        "SAMPLES:{}\nFREQUENCY:{}\nTIMEWINDOW:{}\nLAST TRACE:{}\nTIME INTERVAL:{}\nDISTANCE INTERVAL:{}\nANTENNAS:{}\n",
        samples,
        frequency_mhz,
        header.time_window_ns,
        traces,
        header.time_interval_s,
        header.distance_interval_m,
        header.antenna
    );

    fs::write(path, data).map_err(FormatError::Io)?;
    fs::write(path.with_extension("rad"), rad).map_err(FormatError::Io)?;
    log::debug!("Wrote {} ({}x{})", path.display(), samples, traces);
    Ok(())
}

/// Header values for [`write_dzt`]
#[derive(Clone, Debug)]
pub struct DztOptions {
    /// 8, 16 or 32
    pub bits: u16,
    pub channels: usize,
    pub scans_per_second: f32,
    pub scans_per_meter: f32,
    pub range_ns: f32,
    pub permittivity: f32,
    pub antenna: String,
    pub created: Option<NaiveDateTime>,
}

impl Default for DztOptions {
    fn default() -> Self {
        Self {
            bits: 16,
            channels: 1,
            scans_per_second: 64.0,
            scans_per_meter: 50.0,
            range_ns: 100.0,
            permittivity: 8.0,
            antenna: "3200MLF".to_string(),
            created: None,
        }
    }
}

/// Write `amplitudes` as channel 0 of a GSSI file. Extra channels are
/// filled with mid-scale (zero) samples.
pub fn write_dzt(path: &Path, amplitudes: &Array2<f64>, options: &DztOptions) -> Result<()> {
    if !matches!(options.bits, 8 | 16 | 32) {
        return Err(GprError::InvalidParameter(format!(
            "unsupported word size: {} bits",
            options.bits
        )));
    }
    if options.channels == 0 {
        return Err(GprError::InvalidParameter("at least one channel".to_string()));
    }
    let (samples, _) = amplitudes.dim();
    let samples_field = u16::try_from(samples).map_err(|_| {
        GprError::InvalidParameter(format!("{} samples do not fit a DZT header", samples))
    })?;

    let mut bytes = vec![0u8; DZT_HEADER_BLOCK * options.channels];
    let header = &mut bytes[..DZT_HEADER_BLOCK];
    header[0..2].copy_from_slice(&0x00ffu16.to_le_bytes());
    header[2..4].copy_from_slice(&(DZT_HEADER_BLOCK as u16).to_le_bytes());
    header[4..6].copy_from_slice(&samples_field.to_le_bytes());
    header[6..8].copy_from_slice(&options.bits.to_le_bytes());
    header[10..14].copy_from_slice(&options.scans_per_second.to_le_bytes());
    header[14..18].copy_from_slice(&options.scans_per_meter.to_le_bytes());
    header[26..30].copy_from_slice(&options.range_ns.to_le_bytes());
    let created = options.created.as_ref().map(pack_datetime).unwrap_or(0);
    header[32..36].copy_from_slice(&created.to_le_bytes());
    header[52..54].copy_from_slice(&(options.channels as u16).to_le_bytes());
    header[54..58].copy_from_slice(&options.permittivity.to_le_bytes());
    let name = options.antenna.as_bytes();
    let len = name.len().min(14);
    header[98..98 + len].copy_from_slice(&name[..len]);

    for column in amplitudes.columns() {
        for &value in column.iter() {
            push_word(&mut bytes, value, options.bits);
        }
        for _ in 1..options.channels {
            for _ in 0..samples {
                push_word(&mut bytes, 0.0, options.bits);
            }
        }
    }

    fs::write(path, bytes).map_err(FormatError::Io)?;
    log::debug!("Wrote {} ({} channels)", path.display(), options.channels);
    Ok(())
}

fn push_word(bytes: &mut Vec<u8>, value: f64, bits: u16) {
    match bits {
        8 => bytes.push((value.round() + 128.0).clamp(0.0, 255.0) as u8),
        16 => bytes.extend_from_slice(
            &((value.round() + 32768.0).clamp(0.0, 65535.0) as u16).to_le_bytes(),
        ),
        _ => bytes.extend_from_slice(&(value.round() as i32).to_le_bytes()),
    }
}
