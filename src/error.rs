use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a survey file
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported survey format: {0}")]
    UnsupportedFormat(String),

    #[error("Truncated file: header declares {declared} bytes, found {actual}")]
    TruncatedFile { declared: u64, actual: u64 },

    #[error("Corrupt header: {0}")]
    CorruptHeader(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum GprError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GprError>;
