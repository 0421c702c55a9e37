use std::sync::Arc;

use super::analyzer::FrameRenderer;

/// Gain applied to the average bin magnitude before scaling to percent.
pub const LEVEL_GAIN: f32 = 2.75;

/// Sink for a single level value, e.g. the width of a meter bar.
pub trait LevelDisplay: Send + Sync {
    /// `percent` is in `0.0..=100.0`.
    fn set_level(&self, percent: f32);
}

/// Reduce one frame of byte frequency data to a display percentage.
pub fn level_percent(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    let average = sum as f32 / bins.len() as f32;
    (average * LEVEL_GAIN / 255.0 * 100.0).clamp(0.0, 100.0)
}

/// Level-bar renderer.
pub struct LevelMeter {
    display: Option<Arc<dyn LevelDisplay>>,
    level: f32,
}

impl LevelMeter {
    pub fn new(display: Arc<dyn LevelDisplay>) -> Self {
        Self {
            display: Some(display),
            level: 0.0,
        }
    }

    /// A meter that only tracks the value, for hosts that poll `level()`.
    pub fn detached() -> Self {
        log::warn!("Level meter created without a display");
        Self {
            display: None,
            level: 0.0,
        }
    }

    /// Last computed level in percent.
    pub fn level(&self) -> f32 {
        self.level
    }

    fn publish(&self) {
        if let Some(ref display) = self.display {
            display.set_level(self.level);
        }
    }
}

impl FrameRenderer for LevelMeter {
    fn render(&mut self, bins: &[u8]) {
        self.level = level_percent(bins);
        self.publish();
    }

    fn clear(&mut self) {
        self.level = 0.0;
        self.publish();
    }
}
