use std::path::PathBuf;
use std::time::Duration;

/// Interval at which the encoder is asked to emit accumulated data.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(1000);

/// Encodings probed at session construction, most compressed first.
pub const DEFAULT_MIME_PREFERENCES: [&str; 3] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

/// Configuration for a capture session.
///
/// Fixed for the lifetime of the session once it has been constructed.
#[derive(Debug, Clone)]
pub struct RecorderConfiguration {
    /// Encodings to probe, in order of preference.
    pub mime_preferences: Vec<String>,

    /// Target audio bitrate in bits per second (default: 128000).
    pub audio_bits_per_second: u32,

    /// Target video bitrate in bits per second (default: 2500000).
    pub video_bits_per_second: u32,

    /// Target frame width in pixels (default: 1280).
    pub width: u32,

    /// Target frame height in pixels (default: 720).
    pub height: u32,

    /// How long `stop_recording` waits for the encoder to flush (default: 5s).
    pub stop_timeout: Duration,

    /// Directory used by `persist_to_local_file`.
    pub output_directory: PathBuf,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.mime_preferences.is_empty() {
            return Err("at least one mime type preference is required".into());
        }
        if self.audio_bits_per_second == 0 || self.video_bits_per_second == 0 {
            return Err("bitrates must be positive".into());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("invalid frame size: {}x{}", self.width, self.height));
        }
        if self.stop_timeout.is_zero() {
            return Err("stop timeout must be positive".into());
        }
        Ok(())
    }

    /// The fixed flush cadence handed to every encoder.
    pub fn flush_interval(&self) -> Duration {
        FLUSH_INTERVAL
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            mime_preferences: DEFAULT_MIME_PREFERENCES.iter().map(|s| s.to_string()).collect(),
            audio_bits_per_second: 128_000,
            video_bits_per_second: 2_500_000,
            width: 1280,
            height: 720,
            stop_timeout: Duration::from_secs(5),
            output_directory: PathBuf::from("."),
        }
    }
}
