use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for FieldVisionR
#[derive(Error, Debug)]
pub enum FieldVisionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, FieldVisionError>;
