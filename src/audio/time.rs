//! Frame/sample/seconds conversion on a shared analysis grid

/// Conversion between sample indices, analysis-frame indices, and seconds.
///
/// VAD and feature extraction must run on the same frame grid for the
/// segment-to-feature index mapping to hold. Both take a `TimeIndex`
/// constructed from the same config, so the hop size lives in exactly
/// one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeIndex {
    sample_rate: u32,
    hop_size: usize,
}

impl TimeIndex {
    pub fn new(sample_rate: u32, hop_size: usize) -> Self {
        debug_assert!(sample_rate > 0 && hop_size > 0);
        Self {
            sample_rate,
            hop_size,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of full analysis frames in a waveform of `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        len / self.hop_size
    }

    /// Wall-clock time of the start of frame `frame`
    pub fn frame_to_seconds(&self, frame: usize) -> f32 {
        (frame * self.hop_size) as f32 / self.sample_rate as f32
    }

    /// Nearest frame index for a point in time
    pub fn seconds_to_frame(&self, seconds: f32) -> usize {
        (seconds * self.sample_rate as f32 / self.hop_size as f32).round() as usize
    }

    pub fn sample_to_seconds(&self, sample: usize) -> f32 {
        sample as f32 / self.sample_rate as f32
    }

    pub fn seconds_to_samples(&self, seconds: f32) -> usize {
        (seconds * self.sample_rate as f32) as usize
    }
}

/// Format seconds as `HH:MM:SS`, rounded to whole seconds
pub fn format_hms(seconds: f32) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_round_trip() {
        let grid = TimeIndex::new(16000, 512);
        for frame in [0usize, 1, 10, 100, 312] {
            let t = grid.frame_to_seconds(frame);
            assert_eq!(grid.seconds_to_frame(t), frame);
        }
    }

    #[test]
    fn test_num_frames() {
        let grid = TimeIndex::new(16000, 512);
        assert_eq!(grid.num_frames(0), 0);
        assert_eq!(grid.num_frames(511), 0);
        assert_eq!(grid.num_frames(512), 1);
        assert_eq!(grid.num_frames(16000), 31);
    }

    #[test]
    fn test_sample_conversions() {
        let grid = TimeIndex::new(16000, 512);
        assert_eq!(grid.sample_to_seconds(16000), 1.0);
        assert_eq!(grid.seconds_to_samples(2.5), 40000);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(5.4), "00:00:05");
        assert_eq!(format_hms(5.6), "00:00:06");
        assert_eq!(format_hms(61.0), "00:01:01");
        assert_eq!(format_hms(3661.0), "01:01:01");
        assert_eq!(format_hms(-1.0), "00:00:00");
    }
}
