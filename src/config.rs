//! Configuration structures for the diarization pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub vad: VadConfig,
    pub features: FeatureConfig,
    pub cluster: ClusterConfig,
    pub output: OutputConfig,
    /// Which diarizer backend to use
    pub variant: DiarizerVariant,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that would silently break the pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.sample_rate".to_string(),
                value: self.audio.sample_rate.to_string(),
            });
        }
        if self.audio.hop_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.hop_size".to_string(),
                value: self.audio.hop_size.to_string(),
            });
        }
        if self.cluster.num_speakers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cluster.num_speakers".to_string(),
                value: self.cluster.num_speakers.to_string(),
            });
        }
        if !(self.vad.energy_threshold > 0.0 && self.vad.energy_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "vad.energy_threshold".to_string(),
                value: self.vad.energy_threshold.to_string(),
            });
        }
        if self.features.n_mfcc == 0 {
            return Err(ConfigError::InvalidValue {
                field: "features.n_mfcc".to_string(),
                value: self.features.n_mfcc.to_string(),
            });
        }
        if self.features.n_fft < self.audio.hop_size {
            return Err(ConfigError::InvalidValue {
                field: "features.n_fft".to_string(),
                value: self.features.n_fft.to_string(),
            });
        }
        Ok(())
    }
}

/// Canonical waveform parameters shared by VAD and feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Canonical sample rate (Hz); inputs are resampled to this
    pub sample_rate: u32,
    /// Samples advanced between consecutive analysis frames
    pub hop_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            hop_size: 512,
        }
    }
}

/// Voice activity detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Normalized energy threshold (0.0 - 1.0)
    pub energy_threshold: f32,
    /// Minimum emitted segment length (seconds)
    pub min_segment_length: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.1,
            min_segment_length: 1.0,
        }
    }
}

/// MFCC feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of cepstral coefficients per frame
    pub n_mfcc: usize,
    /// FFT window size (samples)
    pub n_fft: usize,
    /// Number of mel filterbank bands
    pub n_mels: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_mfcc: 20,
            n_fft: 1024,
            n_mels: 40,
        }
    }
}

/// Speaker clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Target number of speakers (clamped to the segment count)
    pub num_speakers: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { num_speakers: 2 }
    }
}

/// Transcript output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Transcript format
    pub format: TranscriptFormat,
    /// Transcript file path (None = stdout only)
    pub output_path: Option<PathBuf>,
}

/// Transcript rendering formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// Consecutive same-speaker segments merged into labeled blocks
    #[default]
    Blocks,
    /// One bracketed line pair per segment, no merging
    Bracketed,
    /// Machine-readable segment list
    Json,
}

impl std::fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptFormat::Blocks => write!(f, "blocks"),
            TranscriptFormat::Bracketed => write!(f, "bracketed"),
            TranscriptFormat::Json => write!(f, "json"),
        }
    }
}

/// Diarizer backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiarizerVariant {
    /// Energy VAD + MFCC + agglomerative clustering, no external models
    #[default]
    Lightweight,
    /// Full model-based backend (external; stubbed in this crate)
    Model,
}

impl std::fmt::Display for DiarizerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiarizerVariant::Lightweight => write!(f, "lightweight"),
            DiarizerVariant::Model => write!(f, "model"),
        }
    }
}
