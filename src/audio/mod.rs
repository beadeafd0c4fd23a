//! Audio loading, frame-grid arithmetic, and voice activity detection

pub mod decode;
pub mod time;
pub mod vad;

pub use decode::{ensure_wav, load_canonical, load_wav, resample};
pub use time::{format_hms, TimeIndex};
pub use vad::{SpeechInterval, VoiceActivityDetector};
