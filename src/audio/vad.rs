//! Voice Activity Detection module

use tracing::{debug, trace};

use crate::audio::time::TimeIndex;
use crate::config::VadConfig;

/// A contiguous stretch of detected speech, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechInterval {
    pub start: f32,
    pub end: f32,
}

/// Energy-based voice activity detector.
///
/// Works on a whole waveform at once: per-frame RMS energy is normalized
/// by its maximum, thresholded, and the resulting speech mask is scanned
/// into intervals. Intervals shorter than the configured minimum are
/// dropped.
pub struct VoiceActivityDetector {
    /// Normalized energy threshold for speech
    threshold: f32,
    /// Minimum emitted interval length in seconds
    min_segment_length: f32,
}

impl VoiceActivityDetector {
    pub fn new(config: &VadConfig) -> Self {
        Self {
            threshold: config.energy_threshold,
            min_segment_length: config.min_segment_length,
        }
    }

    /// Detect speech intervals in a mono waveform.
    ///
    /// Output intervals are non-overlapping and strictly increasing in
    /// start time. A waveform with no energy at all yields an empty list.
    pub fn detect(&self, samples: &[f32], grid: TimeIndex) -> Vec<SpeechInterval> {
        let energy = frame_energies(samples, grid);

        let max_energy = energy.iter().copied().fold(0.0f32, f32::max);
        if max_energy <= 0.0 {
            debug!("All frames silent (max energy zero)");
            return Vec::new();
        }

        let is_speech: Vec<bool> = energy
            .iter()
            .map(|e| e / max_energy > self.threshold)
            .collect();

        let min_samples = grid.seconds_to_samples(self.min_segment_length);
        let mut intervals = Vec::new();
        let mut in_segment = false;
        let mut start_time = 0.0f32;

        for (i, &speech) in is_speech.iter().enumerate() {
            let frame_time = grid.frame_to_seconds(i);

            if speech && !in_segment {
                in_segment = true;
                start_time = frame_time;
            } else if !speech && in_segment {
                self.emit(&mut intervals, start_time, frame_time, i, min_samples, grid);
                in_segment = false;
            }
        }

        // Close a segment still open at the end of the scan
        if in_segment {
            let n = is_speech.len();
            let frame_time = grid.frame_to_seconds(n);
            self.emit(&mut intervals, start_time, frame_time, n, min_samples, grid);
        }

        debug!("VAD found {} speech intervals", intervals.len());
        intervals
    }

    /// Emit `[start_time, end_time)` unless its sample span is below the
    /// minimum; too-short intervals are discarded silently.
    fn emit(
        &self,
        intervals: &mut Vec<SpeechInterval>,
        start_time: f32,
        end_time: f32,
        end_frame: usize,
        min_samples: usize,
        grid: TimeIndex,
    ) {
        let span = (end_frame * grid.hop_size()) as i64
            - (start_time * grid.sample_rate() as f32) as i64;
        if span >= min_samples as i64 {
            intervals.push(SpeechInterval {
                start: start_time,
                end: end_time,
            });
        } else {
            trace!(
                "Discarding short interval {:.2}s - {:.2}s ({} samples)",
                start_time,
                end_time,
                span
            );
        }
    }
}

/// RMS energy of each full hop-sized frame
fn frame_energies(samples: &[f32], grid: TimeIndex) -> Vec<f32> {
    let hop = grid.hop_size();
    let num_frames = grid.num_frames(samples.len());

    (0..num_frames)
        .map(|i| {
            let frame = &samples[i * hop..(i + 1) * hop];
            let sum_squares: f32 = frame.iter().map(|s| s * s).sum();
            (sum_squares / hop as f32).sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 16000;
    const HOP: usize = 512;

    fn grid() -> TimeIndex {
        TimeIndex::new(SAMPLE_RATE, HOP)
    }

    fn make_vad(threshold: f32, min_len: f32) -> VoiceActivityDetector {
        VoiceActivityDetector::new(&VadConfig {
            energy_threshold: threshold,
            min_segment_length: min_len,
        })
    }

    fn tone(duration_secs: f32, amplitude: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration_secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect()
    }

    fn near_silence(duration_secs: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration_secs) as usize;
        vec![0.0001; n]
    }

    #[test]
    fn test_zero_waveform_yields_no_intervals() {
        let vad = make_vad(0.1, 1.0);
        let samples = vec![0.0; SAMPLE_RATE as usize];
        assert!(vad.detect(&samples, grid()).is_empty());
    }

    #[test]
    fn test_single_burst_yields_one_interval() {
        let vad = make_vad(0.5, 1.0);
        let mut samples = tone(2.0, 0.5);
        samples.extend(near_silence(2.0));

        let intervals = vad.detect(&samples, grid());
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].start < 0.1);
        assert!((intervals[0].end - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_two_bursts_yield_two_intervals() {
        // Speech at 0-5s and 10-15s, silence elsewhere (Scenario B shape)
        let vad = make_vad(0.1, 1.0);
        let mut samples = tone(5.0, 0.5);
        samples.extend(near_silence(5.0));
        samples.extend(tone(5.0, 0.5));

        let intervals = vad.detect(&samples, grid());
        assert_eq!(intervals.len(), 2);

        let tolerance = HOP as f32 / SAMPLE_RATE as f32 * 2.0;
        assert!(intervals[0].start.abs() < tolerance);
        assert!((intervals[0].end - 5.0).abs() < tolerance);
        assert!((intervals[1].start - 10.0).abs() < tolerance);
        assert!((intervals[1].end - 15.0).abs() < tolerance);
    }

    #[test]
    fn test_short_burst_discarded() {
        let vad = make_vad(0.1, 1.0);
        // 0.3s burst between stretches of near-silence: below the 1.0s
        // minimum, so it must not be emitted
        let mut samples = near_silence(2.0);
        samples.extend(tone(0.3, 0.5));
        samples.extend(near_silence(2.0));

        assert!(vad.detect(&samples, grid()).is_empty());
    }

    #[test]
    fn test_trailing_segment_closed_at_end() {
        let vad = make_vad(0.1, 1.0);
        // Waveform ends while still in speech
        let mut samples = near_silence(2.0);
        samples.extend(tone(3.0, 0.5));

        let intervals = vad.detect(&samples, grid());
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 2.0).abs() < 0.1);
        assert!((intervals[0].end - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_intervals_strictly_increasing() {
        let vad = make_vad(0.1, 0.5);
        let mut samples = Vec::new();
        for _ in 0..4 {
            samples.extend(tone(1.0, 0.5));
            samples.extend(near_silence(1.0));
        }

        let intervals = vad.detect(&samples, grid());
        assert!(!intervals.is_empty());
        for pair in intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
        for iv in &intervals {
            assert!(iv.end > iv.start);
        }
    }

    #[test]
    fn test_emitted_intervals_respect_min_length() {
        let vad = make_vad(0.1, 1.0);
        let mut samples = Vec::new();
        samples.extend(tone(1.5, 0.5));
        samples.extend(near_silence(1.0));
        samples.extend(tone(0.4, 0.5)); // too short
        samples.extend(near_silence(1.0));
        samples.extend(tone(2.0, 0.5));
        samples.extend(near_silence(0.5));

        let intervals = vad.detect(&samples, grid());
        let frame_secs = HOP as f32 / SAMPLE_RATE as f32;
        for iv in &intervals {
            assert!(iv.end - iv.start >= 1.0 - 2.0 * frame_secs);
        }
        assert_eq!(intervals.len(), 2);
    }
}
