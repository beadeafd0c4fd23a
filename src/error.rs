//! Custom error types for the diarization pipeline

use thiserror::Error;

/// Main error type for the diarization pipeline
#[derive(Error, Debug)]
pub enum DiarizeError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio decoding and canonicalization errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to decode audio file: {0}")]
    Decode(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio conversion failed: {0}")]
    Conversion(String),

    #[error("Resampling error: {0}")]
    Resampling(String),

    #[error("Decoded waveform is empty")]
    EmptyInput,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Speaker clustering errors
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Feature matrix contains non-finite values")]
    DegenerateFeatures,

    #[error("Clustering failed: {0}")]
    Numerical(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, DiarizeError>;
