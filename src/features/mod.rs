//! Per-frame MFCC feature extraction

pub mod mel;

use ndarray::{Array1, Array2};
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::debug;

use crate::audio::time::TimeIndex;
use crate::config::FeatureConfig;
use mel::{dct_matrix, hann_window, mel_filterbank};

/// Guard against log(0) in the mel energy
const LOG_ZERO_GUARD: f32 = 1e-10;

/// MFCC extractor producing one coefficient vector per analysis frame.
///
/// Frame `i` covers samples `[i * hop, i * hop + n_fft)` (tail
/// zero-padded), so the feature rows sit on exactly the same grid as the
/// VAD energy frames for a shared `TimeIndex`. That alignment is what
/// makes the segment-to-row index mapping in [`crate::cluster`] valid.
pub struct FeatureExtractor {
    n_mfcc: usize,
    n_fft: usize,
    n_mels: usize,
}

impl FeatureExtractor {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            n_mfcc: config.n_mfcc,
            n_fft: config.n_fft,
            n_mels: config.n_mels,
        }
    }

    pub fn n_mfcc(&self) -> usize {
        self.n_mfcc
    }

    /// Compute the MFCC matrix, shape `(num_frames, n_mfcc)` with
    /// `num_frames = grid.num_frames(samples.len())`.
    pub fn extract(&self, samples: &[f32], grid: TimeIndex) -> Array2<f32> {
        let num_frames = grid.num_frames(samples.len());
        let freq_bins = self.n_fft / 2 + 1;
        let mut features = Array2::<f32>::zeros((num_frames, self.n_mfcc));

        if num_frames == 0 {
            return features;
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(self.n_fft);
        let window = hann_window(self.n_fft);
        let filterbank = mel_filterbank(self.n_mels, self.n_fft, grid.sample_rate());
        let dct = dct_matrix(self.n_mfcc, self.n_mels);

        let hop = grid.hop_size();
        let mut frame = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut power = Array1::<f32>::zeros(freq_bins);

        for f in 0..num_frames {
            let start = f * hop;

            for i in 0..self.n_fft {
                let sample = samples.get(start + i).copied().unwrap_or(0.0);
                frame[i] = Complex::new(sample * window[i], 0.0);
            }

            fft.process(&mut frame);

            for k in 0..freq_bins {
                power[k] = frame[k].norm_sqr();
            }

            let mel_energy = filterbank.dot(&power);
            let log_mel = mel_energy.mapv(|e| (e + LOG_ZERO_GUARD).ln());
            let mfcc = dct.dot(&log_mel);

            features.row_mut(f).assign(&mfcc);
        }

        debug!(
            "Extracted {} x {} feature matrix",
            features.nrows(),
            features.ncols()
        );

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 16000;
    const HOP: usize = 512;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(&FeatureConfig::default())
    }

    fn tone(freq: f32, duration_secs: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration_secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                0.5 * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_feature_matrix_aligns_with_frame_grid() {
        let grid = TimeIndex::new(SAMPLE_RATE, HOP);
        let samples = tone(440.0, 2.0);
        let features = extractor().extract(&samples, grid);

        assert_eq!(features.nrows(), grid.num_frames(samples.len()));
        assert_eq!(features.ncols(), 20);
    }

    #[test]
    fn test_empty_waveform_yields_empty_matrix() {
        let grid = TimeIndex::new(SAMPLE_RATE, HOP);
        let features = extractor().extract(&[], grid);
        assert_eq!(features.nrows(), 0);
    }

    #[test]
    fn test_features_are_finite_on_silence() {
        let grid = TimeIndex::new(SAMPLE_RATE, HOP);
        let samples = vec![0.0f32; SAMPLE_RATE as usize];
        let features = extractor().extract(&samples, grid);
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_different_tones_separate_in_feature_space() {
        // The gap between two different tones must dwarf the variation
        // between repeats of the same tone, or downstream clustering
        // cannot work.
        let grid = TimeIndex::new(SAMPLE_RATE, HOP);
        let ex = extractor();

        let dist = |a: &Array2<f32>, b: &Array2<f32>| -> f32 {
            let am = a.mean_axis(ndarray::Axis(0)).unwrap();
            let bm = b.mean_axis(ndarray::Axis(0)).unwrap();
            am.iter()
                .zip(bm.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt()
        };

        let low_a = ex.extract(&tone(200.0, 1.0), grid);
        let low_b = ex.extract(&tone(200.0, 1.5), grid);
        let high = ex.extract(&tone(3000.0, 1.0), grid);

        let within = dist(&low_a, &low_b);
        let between = dist(&low_a, &high);
        assert!(
            between > 3.0 * within,
            "between={} should dominate within={}",
            between,
            within
        );
    }
}
