//! MALÅ `.rad` header
//!
//! RAMAC surveys store their header in a text sidecar next to the
//! `.rd3`/`.rd7` data file, one `KEY:VALUE` pair per line.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::FormatError;

/// Header fields used by the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct RadHeader {
    /// Samples per trace
    pub samples: usize,
    /// Number of traces in the data file
    pub last_trace: usize,
    /// Two-way time window in ns
    pub time_window_ns: f64,
    /// Sampling frequency in MHz, if given
    pub frequency_mhz: Option<f64>,
    /// Seconds between traces (0 for distance-triggered surveys)
    pub time_interval_s: f64,
    /// Metres between traces (0 when no wheel was used)
    pub distance_interval_m: f64,
    pub antenna: String,
}

impl FromStr for RadHeader {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: HashMap<String, String> = text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim().to_string()))
            .collect();

        let samples: usize = required(&fields, "SAMPLES")?;
        let last_trace: usize = required(&fields, "LAST TRACE")?;
        if samples == 0 || last_trace == 0 {
            return Err(FormatError::CorruptHeader(format!(
                "non-positive counts: SAMPLES={} LAST TRACE={}",
                samples, last_trace
            )));
        }

        let frequency_mhz: Option<f64> = optional(&fields, "FREQUENCY")?;
        let time_window_ns = match optional::<f64>(&fields, "TIMEWINDOW")? {
            Some(window) => window,
            None => match frequency_mhz {
                Some(freq) if freq > 0.0 => samples as f64 / freq * 1000.0,
                _ => {
                    return Err(FormatError::CorruptHeader(
                        "neither TIMEWINDOW nor FREQUENCY given".to_string(),
                    ));
                }
            },
        };
        if !(time_window_ns.is_finite() && time_window_ns > 0.0) {
            return Err(FormatError::CorruptHeader(format!(
                "time window must be > 0 ns, got {}",
                time_window_ns
            )));
        }

        let time_interval_s = optional(&fields, "TIME INTERVAL")?.unwrap_or(0.0);
        let distance_interval_m = optional(&fields, "DISTANCE INTERVAL")?.unwrap_or(0.0);
        if time_interval_s < 0.0 || distance_interval_m < 0.0 {
            return Err(FormatError::CorruptHeader(format!(
                "negative trace interval: {} s, {} m",
                time_interval_s, distance_interval_m
            )));
        }

        Ok(Self {
            samples,
            last_trace,
            time_window_ns,
            frequency_mhz,
            time_interval_s,
            distance_interval_m,
            antenna: fields.get("ANTENNAS").cloned().unwrap_or_default(),
        })
    }
}

fn required<T: FromStr>(fields: &HashMap<String, String>, key: &str) -> Result<T, FormatError> {
    optional(fields, key)?
        .ok_or_else(|| FormatError::CorruptHeader(format!("missing {}", key)))
}

fn optional<T: FromStr>(
    fields: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, FormatError> {
    fields
        .get(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| FormatError::CorruptHeader(format!("invalid {}: '{}'", key, value)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SAMPLES:512\r\n\
FREQUENCY:5120.000000\r\n\
FREQUENCY STEPS:1\r\n\
SIGNAL POSITION:0\r\n\
DISTANCE FLAG:1\r\n\
TIME FLAG:0\r\n\
TIME INTERVAL:0.000000\r\n\
DISTANCE INTERVAL:0.049800\r\n\
OPERATOR:\r\n\
ANTENNAS:500MHz Shielded\r\n\
TIMEWINDOW:100.000000\r\n\
LAST TRACE:843\r\n";

    #[test]
    fn test_parse_ramac_header() {
        let header: RadHeader = HEADER.parse().unwrap();
        assert_eq!(header.samples, 512);
        assert_eq!(header.last_trace, 843);
        assert_eq!(header.time_window_ns, 100.0);
        assert_eq!(header.distance_interval_m, 0.0498);
        assert_eq!(header.time_interval_s, 0.0);
        assert_eq!(header.antenna, "500MHz Shielded");
        assert_eq!(header.frequency_mhz, Some(5120.0));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let header: RadHeader = "samples: 10\nlast trace: 3\ntimewindow: 50\n".parse().unwrap();
        assert_eq!(header.samples, 10);
        assert_eq!(header.last_trace, 3);
    }

    #[test]
    fn test_time_window_from_frequency() {
        let header: RadHeader = "SAMPLES:512\nFREQUENCY:5120\nLAST TRACE:3\n".parse().unwrap();
        assert!((header.time_window_ns - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_samples() {
        let result = "LAST TRACE:3\nTIMEWINDOW:50\n".parse::<RadHeader>();
        assert!(matches!(result, Err(FormatError::CorruptHeader(_))));
    }

    #[test]
    fn test_zero_traces() {
        let result = "SAMPLES:10\nLAST TRACE:0\nTIMEWINDOW:50\n".parse::<RadHeader>();
        assert!(matches!(result, Err(FormatError::CorruptHeader(_))));
    }

    #[test]
    fn test_unparseable_value() {
        let result = "SAMPLES:ten\nLAST TRACE:3\nTIMEWINDOW:50\n".parse::<RadHeader>();
        assert!(matches!(result, Err(FormatError::CorruptHeader(_))));
    }

    #[test]
    fn test_negative_window() {
        let result = "SAMPLES:10\nLAST TRACE:3\nTIMEWINDOW:-5\n".parse::<RadHeader>();
        assert!(matches!(result, Err(FormatError::CorruptHeader(_))));
    }
}
