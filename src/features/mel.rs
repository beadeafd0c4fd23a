//! Mel filterbank and DCT primitives for cepstral features

use ndarray::Array2;
use std::f32::consts::PI;

/// Generate a Hann window of the given length
pub fn hann_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / window_length as f32).cos())
        .collect()
}

/// Convert Hz to mel scale (Slaney formula)
pub fn hz_to_mel(hz: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f64).ln() / 27.0;

    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

/// Convert mel to Hz scale (Slaney formula)
pub fn mel_to_hz(mel: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f64).ln() / 27.0;

    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        f_sp * mel
    }
}

/// Triangular mel filterbank matrix of shape `(n_mels, n_fft / 2 + 1)`,
/// covering 0 Hz to Nyquist, with Slaney area normalization.
pub fn mel_filterbank(n_mels: usize, n_fft: usize, sample_rate: u32) -> Array2<f32> {
    let freq_bins = n_fft / 2 + 1;
    let mut filterbank = Array2::<f32>::zeros((n_mels, freq_bins));

    let fftfreqs: Vec<f64> = (0..freq_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let fmax = sample_rate as f64 / 2.0;
    let fmax_mel = hz_to_mel(fmax);
    let mel_f: Vec<f64> = (0..=n_mels + 1)
        .map(|i| mel_to_hz(fmax_mel * i as f64 / (n_mels + 1) as f64))
        .collect();

    let fdiff: Vec<f64> = mel_f.windows(2).map(|w| w[1] - w[0]).collect();

    for i in 0..n_mels {
        let enorm = 2.0 / (mel_f[i + 2] - mel_f[i]);
        for (k, &freq) in fftfreqs.iter().enumerate() {
            let lower = (freq - mel_f[i]) / fdiff[i];
            let upper = (mel_f[i + 2] - freq) / fdiff[i + 1];
            let weight = lower.min(upper).max(0.0);
            filterbank[[i, k]] = (weight * enorm) as f32;
        }
    }

    filterbank
}

/// Orthonormal DCT-II matrix of shape `(n_out, n_in)`
pub fn dct_matrix(n_out: usize, n_in: usize) -> Array2<f32> {
    let mut dct = Array2::<f32>::zeros((n_out, n_in));
    let scale0 = (1.0 / n_in as f32).sqrt();
    let scale = (2.0 / n_in as f32).sqrt();

    for k in 0..n_out {
        let a = if k == 0 { scale0 } else { scale };
        for n in 0..n_in {
            dct[[k, n]] = a * (PI / n_in as f32 * (n as f32 + 0.5) * k as f32).cos();
        }
    }

    dct
}
