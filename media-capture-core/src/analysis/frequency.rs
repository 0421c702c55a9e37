//! Frequency-domain analysis of a time-domain audio window.
//!
//! Produces per-bin byte magnitudes the way a browser analyser node does:
//! Blackman window, FFT, temporal smoothing, decibel conversion and scaling
//! of the `[min_decibels, max_decibels]` range onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::AnalyserSettings;

pub struct FrequencyAnalyser {
    settings: AnalyserSettings,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(settings: AnalyserSettings) -> Self {
        let n = settings.fft_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n);

        // Blackman window
        let window = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; settings.frequency_bin_count()],
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyserSettings {
        &self.settings
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Analyse the most recent `fft_size` samples and write one byte per bin
    /// into `out`.
    ///
    /// Shorter input is treated as silence preceding the given samples; longer
    /// input uses only its tail. `out` is filled up to the bin count.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        let n = self.settings.fft_size;
        let samples = if samples.len() > n {
            &samples[samples.len() - n..]
        } else {
            samples
        };
        let offset = n - samples.len();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i >= offset { samples[i - offset] } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let tau = self.settings.smoothing_time_constant;
        let range = self.settings.max_decibels - self.settings.min_decibels;

        for (k, prev) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[k].norm() / n as f32;
            *prev = tau * *prev + (1.0 - tau) * magnitude;

            if let Some(byte) = out.get_mut(k) {
                let db = if *prev > 0.0 { 20.0 * prev.log10() } else { f32::NEG_INFINITY };
                let scaled = 255.0 * (db - self.settings.min_decibels) / range;
                *byte = scaled.clamp(0.0, 255.0) as u8;
            }
        }
    }
}
