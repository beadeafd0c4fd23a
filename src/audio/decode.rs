//! Audio loading and canonicalization - WAV decode, downmix, resampling

use std::path::{Path, PathBuf};

use rubato::{FftFixedIn, Resampler};
use tracing::{debug, info};

use crate::error::{AudioError, Result};

/// Decode a WAV file into mono f32 samples plus its native sample rate.
///
/// Integer sample formats are scaled to [-1, 1]; multichannel input is
/// downmixed by averaging.
pub fn load_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| AudioError::Decode(e.to_string()))?;

    let spec = reader.spec();
    debug!(
        "WAV format: {} channels, {} Hz, {} bits",
        spec.channels, spec.sample_rate, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    let mono: Vec<f32> = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|chunk| chunk.iter().sum::<f32>() / spec.channels as f32)
            .collect()
    } else {
        samples
    };

    if mono.is_empty() {
        return Err(AudioError::EmptyInput.into());
    }

    Ok((mono, spec.sample_rate))
}

/// Resample a whole mono buffer from `src_rate` to `dst_rate`
pub fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>> {
    if src_rate == dst_rate {
        return Ok(samples.to_vec());
    }
    if src_rate == 0 {
        return Err(AudioError::InvalidSampleRate(src_rate).into());
    }

    debug!("Resampling: {} Hz -> {} Hz", src_rate, dst_rate);

    let mut resampler = FftFixedIn::<f32>::new(
        src_rate as usize,
        dst_rate as usize,
        1024, // chunk size
        1,    // sub-chunks
        1,    // channels
    )
    .map_err(|e| AudioError::Resampling(e.to_string()))?;

    let ratio = dst_rate as f64 / src_rate as f64;
    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + 1024);
    let mut pos = 0;

    while pos < samples.len() {
        let needed = resampler.input_frames_next();
        let remaining = samples.len() - pos;

        let result = if remaining >= needed {
            let chunk = samples[pos..pos + needed].to_vec();
            pos += needed;
            resampler
                .process(&[chunk], None)
                .map_err(|e| AudioError::Resampling(e.to_string()))?
        } else {
            let chunk = samples[pos..].to_vec();
            pos = samples.len();
            resampler
                .process_partial(Some(&[chunk]), None)
                .map_err(|e| AudioError::Resampling(e.to_string()))?
        };

        if let Some(resampled) = result.into_iter().next() {
            output.extend(resampled);
        }
    }

    Ok(output)
}

/// Make sure the input is a decodable WAV file, transcoding via ffmpeg
/// when it is not.
///
/// Returns the original path when it already decodes; otherwise writes
/// `<stem>_converted.wav` next to the input at the canonical rate and
/// returns that path.
pub fn ensure_wav(path: &Path, target_rate: u32) -> Result<PathBuf> {
    let is_wav = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav && hound::WavReader::open(path).is_ok() {
        return Ok(path.to_path_buf());
    }

    let converted = path.with_file_name(format!(
        "{}_converted.wav",
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string())
    ));

    info!(
        "Converting {} to WAV via ffmpeg: {}",
        path.display(),
        converted.display()
    );

    let status = std::process::Command::new("ffmpeg")
        .args(["-i"])
        .arg(path)
        .args(["-ar", &target_rate.to_string(), "-ac", "1", "-c:a", "pcm_s16le"])
        .arg(&converted)
        .arg("-y")
        .status()
        .map_err(|e| AudioError::Conversion(format!("failed to run ffmpeg: {}", e)))?;

    if !status.success() {
        return Err(AudioError::Conversion(format!(
            "ffmpeg exited with status {:?}",
            status.code()
        ))
        .into());
    }

    Ok(converted)
}

/// Load any supported audio file as a canonical mono waveform at
/// `target_rate`, transcoding and resampling as needed.
pub fn load_canonical(path: &Path, target_rate: u32) -> Result<Vec<f32>> {
    let wav_path = ensure_wav(path, target_rate)?;
    let (samples, src_rate) = load_wav(&wav_path)?;
    let samples = resample(&samples, src_rate, target_rate)?;

    if samples.is_empty() {
        return Err(AudioError::EmptyInput.into());
    }

    debug!(
        "Loaded {} samples ({:.2}s) at {} Hz",
        samples.len(),
        samples.len() as f32 / target_rate as f32,
        target_rate
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_wav_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let samples: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        write_test_wav(&path, &samples, 16000, 1);

        let (loaded, rate) = load_wav(&path).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(loaded.len(), 1600);
        assert!((loaded[100] - samples[100]).abs() < 1e-6);
    }

    #[test]
    fn test_load_wav_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Interleaved L/R with constant values 0.2 and 0.6
        let samples: Vec<f32> = (0..800)
            .map(|i| if i % 2 == 0 { 0.2 } else { 0.6 })
            .collect();
        write_test_wav(&path, &samples, 16000, 2);

        let (loaded, _) = load_wav(&path).unwrap();
        assert_eq!(loaded.len(), 400);
        assert!(loaded.iter().all(|s| (s - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_load_wav_rejects_missing_file() {
        let result = load_wav(Path::new("/nonexistent/file.wav"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_wav_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_test_wav(&path, &[], 16000, 1);

        let result = load_wav(&path);
        assert!(matches!(
            result,
            Err(crate::error::DiarizeError::Audio(AudioError::EmptyInput))
        ));
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        let out = resample(&samples, 16000, 16000).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_resample_halves_length() {
        // 1 second at 32 kHz down to 16 kHz
        let samples: Vec<f32> = (0..32000)
            .map(|i| (i as f32 * 2.0 * std::f32::consts::PI * 440.0 / 32000.0).sin())
            .collect();
        let out = resample(&samples, 32000, 16000).unwrap();
        assert!(
            out.len() > 14000 && out.len() < 18000,
            "Expected ~16000 samples, got {}",
            out.len()
        );
    }

    #[test]
    fn test_ensure_wav_passes_valid_wav_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid.wav");
        write_test_wav(&path, &[0.1; 160], 16000, 1);

        let out = ensure_wav(&path, 16000).unwrap();
        assert_eq!(out, path);
    }
}
