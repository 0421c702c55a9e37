use std::sync::Arc;

use super::analyzer::{FrameRenderer, SignalAnalyzer};

/// Bar width in CSS pixels.
pub const BAR_WIDTH: f32 = 3.0;
/// Gap between bars in CSS pixels.
pub const BAR_GAP: f32 = 2.0;

/// Size of the host area the spectrum is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    /// Backing-store size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpr = if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        (
            (self.css_width * dpr).max(0.0) as u32,
            (self.css_height * dpr).max(0.0) as u32,
        )
    }
}

/// One bar of the spectrum, in device pixels with the origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Hue in degrees, swept across the bin index.
    pub hue: f32,
}

impl SpectrumBar {
    /// Fully saturated, mid-lightness color of this bar.
    pub fn rgb(&self) -> [u8; 3] {
        hsl_to_rgb(self.hue, 1.0, 0.5)
    }
}

/// Everything needed to paint one frame: a black background plus bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    pub width: u32,
    pub height: u32,
    pub bars: Vec<SpectrumBar>,
}

/// Drawing surface for spectrum frames.
pub trait SpectrumCanvas: Send + Sync {
    fn draw(&self, frame: &SpectrumFrame);

    fn clear(&self, width: u32, height: u32);
}

/// Bar-spectrum renderer.
pub struct SpectrumRenderer {
    canvas: Arc<dyn SpectrumCanvas>,
    viewport: Viewport,
    width: u32,
    height: u32,
}

impl SpectrumRenderer {
    pub fn new(canvas: Arc<dyn SpectrumCanvas>, viewport: Viewport) -> Self {
        let (width, height) = viewport.pixel_size();
        Self {
            canvas,
            viewport,
            width,
            height,
        }
    }

    /// Re-derive the pixel dimensions after the host viewport changed.
    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.pixel_size();
        log::debug!("Spectrum resized to {}x{} px", width, height);
        self.viewport = viewport;
        self.width = width;
        self.height = height;
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Lay out one frame.
    ///
    /// The row is centered as if every bin had a bar. Silent bins are
    /// skipped without taking a slot, so drawn bars pack to the left of that
    /// row. Hue follows the bin index.
    pub fn layout(&self, bins: &[u8]) -> SpectrumFrame {
        let scale = self.viewport.device_pixel_ratio.max(1.0);
        let bar_width = BAR_WIDTH * scale;
        let step = (BAR_WIDTH + BAR_GAP) * scale;
        let height = self.height as f32;
        let count = bins.len();

        let total_width = count as f32 * step;
        let mut x = (self.width as f32 - total_width) / 2.0;

        let mut bars = Vec::with_capacity(count);
        for (i, &value) in bins.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let bar_height = value as f32 / 255.0 * height;
            bars.push(SpectrumBar {
                x,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
                hue: i as f32 / count as f32 * 360.0,
            });
            x += step;
        }

        SpectrumFrame {
            width: self.width,
            height: self.height,
            bars,
        }
    }
}

impl FrameRenderer for SpectrumRenderer {
    fn render(&mut self, bins: &[u8]) {
        let frame = self.layout(bins);
        self.canvas.draw(&frame);
    }

    fn clear(&mut self) {
        self.canvas.clear(self.width, self.height);
    }
}

impl SignalAnalyzer<SpectrumRenderer> {
    /// Forward a host viewport change to the renderer.
    pub fn resize(&self, viewport: Viewport) {
        self.with_renderer(|r| r.resize(viewport));
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in `0..=1`) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
