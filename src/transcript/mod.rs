//! Transcript assembly - segment list serialization and text rendering

use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::audio::time::format_hms;
use crate::config::TranscriptFormat;
use crate::error::Result;

/// Label used when a segment never received a cluster assignment
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN SPEAKER";

/// One diarized stretch of speech.
///
/// Created by VAD with empty text and no speaker; the clusterer fills in
/// `speaker` and a transcript source fills in `text` before assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f32,
    /// End time in seconds
    pub end: f32,
    /// Transcribed text
    #[serde(default)]
    pub text: String,
    /// Speaker label, e.g. "SPEAKER 1"
    #[serde(default, serialize_with = "serialize_speaker")]
    pub speaker: Option<String>,
}

fn serialize_speaker<S: Serializer>(
    speaker: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER))
}

impl Segment {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            text: String::new(),
            speaker: None,
        }
    }

    /// Display label, falling back to [`UNKNOWN_SPEAKER`]
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER)
    }
}

/// Renders speaker-labeled segments into the configured transcript format
pub struct TranscriptAssembler {
    format: TranscriptFormat,
}

impl TranscriptAssembler {
    pub fn new(format: TranscriptFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, segments: &[Segment]) -> Result<String> {
        Ok(match self.format {
            TranscriptFormat::Blocks => render_blocks(segments),
            TranscriptFormat::Bracketed => render_bracketed(segments),
            TranscriptFormat::Json => segments_to_json(segments)?,
        })
    }

    /// Render and write the transcript to `path`, creating parent
    /// directories as needed.
    pub fn write(&self, segments: &[Segment], path: &Path) -> Result<()> {
        let text = self.render(segments)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, text)?;
        debug!("Wrote transcript: {}", path.display());
        Ok(())
    }
}

/// Merged-block format: a new labeled block opens at every speaker
/// change, then each segment's trimmed text follows with a single
/// trailing space.
pub fn render_blocks(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let speaker_changed =
            i == 0 || segments[i - 1].speaker_label() != segment.speaker_label();
        if speaker_changed {
            out.push_str(&format!(
                "\n{} [{}]\n",
                segment.speaker_label(),
                format_hms(segment.start)
            ));
        }
        out.push_str(segment.text.trim());
        out.push(' ');
    }
    out
}

/// Bracketed per-segment format, one line pair per segment, no merging:
/// `[HH:MM:SS --> HH:MM:SS] {speaker}: {text}\n\n`.
pub fn render_bracketed(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&format!(
            "[{} --> {}] {}: {}\n\n",
            format_hms(segment.start),
            format_hms(segment.end),
            segment.speaker_label(),
            segment.text
        ));
    }
    out
}

/// Parse the bracketed format back into segments; malformed lines are
/// skipped. Times come back at whole-second resolution.
pub fn parse_bracketed(text: &str) -> Vec<Segment> {
    text.lines()
        .filter_map(|line| {
            let rest = line.strip_prefix('[')?;
            let (times, rest) = rest.split_once(']')?;
            let (start, end) = times.split_once(" --> ")?;
            let (speaker, text) = rest.trim_start().split_once(": ")?;
            Some(Segment {
                start: parse_hms(start)?,
                end: parse_hms(end)?,
                text: text.to_string(),
                speaker: Some(speaker.to_string()),
            })
        })
        .collect()
}

fn parse_hms(s: &str) -> Option<f32> {
    let mut parts = s.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((hours * 3600 + minutes * 60 + seconds) as f32)
}

/// Structured segment list (output artifact 1)
pub fn segments_to_json(segments: &[Segment]) -> Result<String> {
    serde_json::to_string_pretty(segments)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}
