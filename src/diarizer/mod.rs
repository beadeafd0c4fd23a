//! Diarization pipeline orchestration and backend selection

use std::path::Path;

use tracing::{debug, info};

use crate::audio::{load_canonical, TimeIndex, VoiceActivityDetector};
use crate::cluster::{aggregate_segment_features, assign_speakers, AgglomerativeClusterer};
use crate::config::{Config, DiarizerVariant};
use crate::error::{AudioError, Result};
use crate::features::FeatureExtractor;
use crate::transcript::{Segment, TranscriptAssembler};

/// Supplies transcript text for diarized segments.
///
/// The pipeline itself never transcribes; a real STT engine implements
/// this trait, and [`PlaceholderTranscripts`] stands in when none is
/// wired up.
pub trait TranscriptSource {
    fn text_for(&self, index: usize, segment: &Segment) -> String;
}

const PLACEHOLDER_LINES: [&str; 5] = [
    "This is placeholder text for the lightweight version.",
    "Switch to the full model backend for actual transcription.",
    "This segment would contain the actual transcribed speech.",
    "The lightweight version only focuses on speaker diarization.",
    "Enable the full model backend for complete transcription.",
];

/// Deterministic placeholder text source: cycles a fixed set of lines
pub struct PlaceholderTranscripts;

impl TranscriptSource for PlaceholderTranscripts {
    fn text_for(&self, index: usize, _segment: &Segment) -> String {
        PLACEHOLDER_LINES[index % PLACEHOLDER_LINES.len()].to_string()
    }
}

/// Output of one pipeline invocation
#[derive(Debug, Clone)]
pub struct DiarizationResult {
    /// Speaker-labeled, texted segments (output artifact 1)
    pub segments: Vec<Segment>,
    /// Rendered transcript in the configured format (output artifact 2)
    pub transcript: String,
}

/// Single-pass diarization pipeline: VAD, feature extraction, speaker
/// clustering, transcript assembly.
///
/// Each invocation owns all its intermediate buffers; nothing is shared
/// between calls, so separate invocations may run in parallel from
/// separate threads. There are no retries: a run either completes or
/// fails with no partial output.
pub struct DiarizationPipeline {
    config: Config,
}

impl DiarizationPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Diarize an audio file, decoding and resampling it to the
    /// canonical mono waveform first.
    pub fn run_file(&self, path: &Path) -> Result<DiarizationResult> {
        info!("Diarizing: {}", path.display());
        let samples = load_canonical(path, self.config.audio.sample_rate)?;
        self.run(&samples)
    }

    /// Diarize a canonical mono waveform (at the configured sample rate)
    /// using placeholder transcript text.
    pub fn run(&self, samples: &[f32]) -> Result<DiarizationResult> {
        self.run_with_source(samples, &PlaceholderTranscripts)
    }

    /// Diarize a canonical mono waveform, attaching text from `source`.
    pub fn run_with_source(
        &self,
        samples: &[f32],
        source: &dyn TranscriptSource,
    ) -> Result<DiarizationResult> {
        if samples.is_empty() {
            return Err(AudioError::EmptyInput.into());
        }

        let grid = TimeIndex::new(self.config.audio.sample_rate, self.config.audio.hop_size);

        let vad = VoiceActivityDetector::new(&self.config.vad);
        let intervals = vad.detect(samples, grid);
        debug!("Segmented: {} speech intervals", intervals.len());

        let mut segments: Vec<Segment> = intervals
            .iter()
            .map(|iv| Segment::new(iv.start, iv.end))
            .collect();

        // No speech is a valid outcome, not an error: skip straight to
        // assembly with an empty result.
        if segments.is_empty() {
            info!("No speech detected");
            return self.assemble(segments);
        }

        let extractor = FeatureExtractor::new(&self.config.features);
        let features = extractor.extract(samples, grid);
        debug!("Featured: {} frames", features.nrows());

        let vectors = aggregate_segment_features(&features, &segments, grid);
        let clusterer = AgglomerativeClusterer::new(&self.config.cluster);
        let labels = clusterer.cluster(&vectors)?;
        assign_speakers(&mut segments, &labels);
        debug!("Clustered: {} labels", labels.len());

        for (i, segment) in segments.iter_mut().enumerate() {
            segment.text = source.text_for(i, segment);
        }

        self.assemble(segments)
    }

    fn assemble(&self, segments: Vec<Segment>) -> Result<DiarizationResult> {
        let assembler = TranscriptAssembler::new(self.config.output.format);
        let transcript = assembler.render(&segments)?;
        info!("Assembled {} segments", segments.len());
        Ok(DiarizationResult {
            segments,
            transcript,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Capability interface for diarizer backends.
///
/// Variants are selected by [`DiarizerVariant`] in the configuration;
/// external model-based backends plug in by implementing this trait.
pub trait Diarizer {
    /// Process an audio file into speaker-labeled, texted segments
    fn process_file(&self, path: &Path) -> Result<Vec<Segment>>;
}

/// The built-in lightweight backend: energy VAD, MFCC features, and
/// agglomerative clustering.
pub struct EnergyDiarizer {
    pipeline: DiarizationPipeline,
}

impl EnergyDiarizer {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: DiarizationPipeline::new(config),
        }
    }
}

impl Diarizer for EnergyDiarizer {
    fn process_file(&self, path: &Path) -> Result<Vec<Segment>> {
        Ok(self.pipeline.run_file(path)?.segments)
    }
}

/// Stub for the full model-based backend, which lives outside this
/// crate. Returns a single SYSTEM segment pointing the caller at the
/// external implementation.
pub struct ModelDiarizer;

impl Diarizer for ModelDiarizer {
    fn process_file(&self, _path: &Path) -> Result<Vec<Segment>> {
        Ok(vec![Segment {
            start: 0.0,
            end: 1.0,
            text: "The model-based backend is not bundled with this build. \
                   Provide an external Diarizer implementation or use the \
                   lightweight variant."
                .to_string(),
            speaker: Some("SYSTEM".to_string()),
        }])
    }
}

/// Construct the diarizer backend selected by the configuration
pub fn create_diarizer(config: &Config) -> Box<dyn Diarizer> {
    match config.variant {
        DiarizerVariant::Lightweight => Box::new(EnergyDiarizer::new(config.clone())),
        DiarizerVariant::Model => Box::new(ModelDiarizer),
    }
}
