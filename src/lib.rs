//! Offline Speaker Diarization
//!
//! A Rust library for attributing speech segments in an audio recording
//! to distinct speakers: energy-based voice activity detection, MFCC
//! feature extraction, and agglomerative speaker clustering, assembled
//! into time-aligned transcripts.
//!
//! # Architecture
//!
//! The system is organized into the following modules:
//!
//! - `audio`: WAV decoding, canonicalization, frame-grid arithmetic, VAD
//! - `features`: per-frame MFCC feature extraction
//! - `cluster`: segment feature aggregation and speaker clustering
//! - `transcript`: segment types, transcript rendering and parsing
//! - `diarizer`: pipeline orchestration and backend selection
//! - `config`: configuration structures
//! - `error`: error types
//!
//! # Example
//!
//! ```no_run
//! use diarize_rs::{Config, DiarizationPipeline};
//!
//! let config = Config::default();
//! let pipeline = DiarizationPipeline::new(config);
//!
//! let result = pipeline.run_file(std::path::Path::new("meeting.wav")).unwrap();
//! for segment in &result.segments {
//!     println!("{}: {:.1}s - {:.1}s", segment.speaker_label(), segment.start, segment.end);
//! }
//! ```

pub mod audio;
pub mod cluster;
pub mod config;
pub mod diarizer;
pub mod error;
pub mod features;
pub mod transcript;

// Re-exports for convenience
pub use audio::{format_hms, SpeechInterval, TimeIndex, VoiceActivityDetector};
pub use cluster::AgglomerativeClusterer;
pub use config::{Config, DiarizerVariant, TranscriptFormat};
pub use diarizer::{
    create_diarizer, DiarizationPipeline, DiarizationResult, Diarizer, EnergyDiarizer,
    PlaceholderTranscripts, TranscriptSource,
};
pub use error::{AudioError, ClusterError, ConfigError, DiarizeError, Result};
pub use features::FeatureExtractor;
pub use transcript::{Segment, TranscriptAssembler};
