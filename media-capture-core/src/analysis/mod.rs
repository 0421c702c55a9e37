//! Real-time visual feedback for the audio of a capture stream.
//!
//! One `SignalAnalyzer` drives a per-frame loop that samples the connected
//! stream, runs it through a `FrequencyAnalyser` and hands the byte spectrum
//! to a renderer. Two renderers are provided: `LevelMeter` (scalar level bar)
//! and `SpectrumRenderer` (bar spectrum). Both share the same analysis
//! settings.

pub mod analyzer;
pub mod animation;
pub mod frequency;
pub mod level;
pub mod spectrum;

pub use analyzer::{FrameRenderer, ProcessingState, SignalAnalyzer};
pub use level::{LevelDisplay, LevelMeter};
pub use spectrum::{SpectrumCanvas, SpectrumFrame, SpectrumRenderer, Viewport};

/// Level bar: analyser driving a `LevelMeter`.
pub type LevelIndicator = SignalAnalyzer<LevelMeter>;

/// Bar spectrum: analyser driving a `SpectrumRenderer`.
pub type AudioVisualizer = SignalAnalyzer<SpectrumRenderer>;

/// Analysis parameters shared by every presentation variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserSettings {
    /// FFT window size in samples; yields `fft_size / 2` bins (default: 256).
    pub fft_size: usize,

    /// Temporal smoothing between frames, `0.0..1.0` (default: 0.85).
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (default: -90 dB).
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (default: -10 dB).
    pub max_decibels: f32,
}

impl AnalyserSettings {
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fft_size < 32 || !self.fft_size.is_power_of_two() {
            return Err(format!("fft size must be a power of two >= 32, got {}", self.fft_size));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err("min decibels must be below max decibels".into());
        }
        Ok(())
    }
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing_time_constant: 0.85,
            min_decibels: -90.0,
            max_decibels: -10.0,
        }
    }
}
