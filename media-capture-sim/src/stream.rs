//! Simulated streams, tracks and audio taps.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use media_capture_core::models::media_models::TrackKind;
use media_capture_core::traits::capture_host::{MediaStream, MediaTrack, SampleTap};

/// A track bound to one simulated device.
#[derive(Debug)]
pub struct SimulatedTrack {
    id: String,
    kind: TrackKind,
    label: String,
    device_id: String,
    live: AtomicBool,
}

impl SimulatedTrack {
    pub fn new(kind: TrackKind, device_id: &str, label: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label: label.to_string(),
            device_id: device_id.to_string(),
            live: AtomicBool::new(true),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl MediaTrack for SimulatedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("Released simulated device {}", self.device_id);
        }
    }
}

/// Continuous sine tone sampled at wall-clock time.
#[derive(Debug)]
pub struct SineTap {
    frequency: f32,
    amplitude: f32,
    sample_rate: f32,
    origin: Instant,
}

impl SineTap {
    pub fn new(frequency: f32, amplitude: f32, sample_rate: f32) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            origin: Instant::now(),
        }
    }
}

impl SampleTap for SineTap {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        let now = self.origin.elapsed().as_secs_f64();
        let len = out.len();
        for (i, sample) in out.iter_mut().enumerate() {
            let t = now - (len - i) as f64 / self.sample_rate as f64;
            let phase = (2.0 * PI as f64 * self.frequency as f64 * t) as f32;
            *sample = self.amplitude * phase.sin();
        }
        len
    }
}

/// A stream handed out by `SimulatedHost`.
pub struct SimulatedStream {
    id: String,
    tracks: Vec<Arc<SimulatedTrack>>,
    tap: Option<Arc<SineTap>>,
}

impl SimulatedStream {
    pub fn new(tracks: Vec<Arc<SimulatedTrack>>, tap: Option<Arc<SineTap>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
            tap,
        }
    }

    /// Device IDs backing this stream, in track order.
    pub fn device_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.device_id.clone()).collect()
    }

    /// Whether every track still holds its device.
    pub fn is_active(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| t.is_live())
    }

    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }
}

impl MediaStream for SimulatedStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn MediaTrack>)
            .collect()
    }

    fn audio_tap(&self) -> Option<Arc<dyn SampleTap>> {
        self.tap.clone().map(|t| t as Arc<dyn SampleTap>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopping_tracks_deactivates_stream() {
        let stream = SimulatedStream::new(
            vec![
                Arc::new(SimulatedTrack::new(TrackKind::Audio, "mic1", "Mic")),
                Arc::new(SimulatedTrack::new(TrackKind::Video, "cam1", "Cam")),
            ],
            None,
        );
        assert!(stream.is_active());
        assert!(stream.has_kind(TrackKind::Video));

        stream.stop_tracks();

        assert!(!stream.is_active());
        assert_eq!(stream.live_track_count(), 0);
        assert_eq!(stream.device_ids(), vec!["mic1".to_string(), "cam1".to_string()]);
    }

    #[test]
    fn sine_tap_fills_buffer() {
        let tap = SineTap::new(440.0, 0.5, 48000.0);
        let mut out = [0.0f32; 256];

        assert_eq!(tap.read_latest(&mut out), 256);
        assert!(out.iter().all(|s| s.abs() <= 0.5 + 1e-6));
        assert!(out.iter().any(|s| s.abs() > 0.1));
    }
}
