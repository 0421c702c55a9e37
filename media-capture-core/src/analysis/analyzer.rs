use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::animation::{AnimationLoop, FRAME_INTERVAL};
use super::frequency::FrequencyAnalyser;
use super::AnalyserSettings;
use crate::models::error::CaptureError;
use crate::traits::capture_host::{SampleTap, StreamHandle};

/// Turns one frame of byte frequency data into visual output.
pub trait FrameRenderer: Send + 'static {
    fn render(&mut self, bins: &[u8]);

    /// Reset the output to its empty state.
    fn clear(&mut self);
}

/// Whether the processing graph is pulling audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Suspended,
    Running,
}

/// Everything the animation thread touches.
struct AnalysisGraph<R> {
    state: ProcessingState,
    analyser: FrequencyAnalyser,
    source: Option<Arc<dyn SampleTap>>,
    renderer: R,
    samples: Vec<f32>,
    bins: Vec<u8>,
}

impl<R: FrameRenderer> AnalysisGraph<R> {
    fn tick(&mut self) {
        let available = match self.source {
            Some(ref source) => source.read_latest(&mut self.samples),
            None => 0,
        };
        self.analyser
            .byte_frequency_data(&self.samples[..available], &mut self.bins);
        self.renderer.render(&self.bins);
    }
}

/// Samples the audio of a connected stream every frame and feeds a renderer.
pub struct SignalAnalyzer<R: FrameRenderer> {
    graph: Arc<Mutex<AnalysisGraph<R>>>,
    animation: Option<AnimationLoop>,
    frame_interval: Duration,
}

impl<R: FrameRenderer> SignalAnalyzer<R> {
    pub fn new(renderer: R) -> Self {
        Self::build(renderer, AnalyserSettings::default())
    }

    pub fn with_settings(renderer: R, settings: AnalyserSettings) -> Result<Self, CaptureError> {
        settings.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self::build(renderer, settings))
    }

    fn build(renderer: R, settings: AnalyserSettings) -> Self {
        let graph = AnalysisGraph {
            state: ProcessingState::Suspended,
            samples: vec![0.0; settings.fft_size],
            bins: vec![0; settings.frequency_bin_count()],
            analyser: FrequencyAnalyser::new(settings),
            source: None,
            renderer,
        };
        Self {
            graph: Arc::new(Mutex::new(graph)),
            animation: None,
            frame_interval: FRAME_INTERVAL,
        }
    }

    /// Override the per-frame interval (default: ~16 ms).
    pub fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.graph.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.graph.lock().source.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| a.is_running())
    }

    /// Route the audio of `stream` into the analyser.
    ///
    /// Resumes a suspended graph and disconnects any previous source first.
    pub fn connect(&mut self, stream: &StreamHandle) -> Result<(), CaptureError> {
        let mut graph = self.graph.lock();

        if graph.state == ProcessingState::Suspended {
            graph.state = ProcessingState::Running;
            log::debug!("Resumed analysis graph");
        }

        if graph.source.take().is_some() {
            log::debug!("Disconnected previous analysis source");
        }

        let Some(tap) = stream.audio_tap() else {
            let e = CaptureError::NoAudioTrack;
            log::error!("Error connecting stream {} to analyser: {}", stream.id(), e);
            return Err(e);
        };

        graph.analyser.reset();
        graph.source = Some(tap);
        log::debug!("Connected stream {} to analyser", stream.id());
        Ok(())
    }

    /// Detach the current source. The loop keeps running and decays to silence.
    pub fn disconnect(&mut self) {
        self.graph.lock().source = None;
    }

    /// Start the per-frame loop, restarting it if already running.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.animation.is_some() {
            self.stop();
        }

        let graph = Arc::clone(&self.graph);
        let animation = AnimationLoop::start("signal-analyzer", self.frame_interval, move || {
            graph.lock().tick();
        })?;
        self.animation = Some(animation);
        log::debug!("Started analyser loop");
        Ok(())
    }

    /// Cancel the loop and clear the renderer. No-op when not running.
    pub fn stop(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.cancel();
            self.graph.lock().renderer.clear();
            log::debug!("Stopped analyser loop");
        }
    }

    /// Run `f` against the renderer, holding the graph lock.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.graph.lock().renderer)
    }
}

impl<R: FrameRenderer> Drop for SignalAnalyzer<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media_models::TrackKind;
    use crate::traits::capture_host::{MediaStream, MediaTrack};
    use std::thread;

    struct ConstantTap(f32);

    impl SampleTap for ConstantTap {
        fn sample_rate(&self) -> f32 {
            48000.0
        }

        fn read_latest(&self, out: &mut [f32]) -> usize {
            for (i, s) in out.iter_mut().enumerate() {
                *s = if i % 2 == 0 { self.0 } else { -self.0 };
            }
            out.len()
        }
    }

    struct TestStream {
        tap: Option<Arc<dyn SampleTap>>,
    }

    impl MediaStream for TestStream {
        fn id(&self) -> &str {
            "test-stream"
        }

        fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
            Vec::new()
        }

        fn audio_tap(&self) -> Option<Arc<dyn SampleTap>> {
            self.tap.clone()
        }

        fn has_kind(&self, kind: TrackKind) -> bool {
            kind == TrackKind::Audio && self.tap.is_some()
        }
    }

    #[derive(Default)]
    struct Recording {
        frames: usize,
        last_max: u8,
        cleared: usize,
    }

    struct RecordingRenderer(Arc<Mutex<Recording>>);

    impl FrameRenderer for RecordingRenderer {
        fn render(&mut self, bins: &[u8]) {
            let mut r = self.0.lock();
            r.frames += 1;
            r.last_max = bins.iter().copied().max().unwrap_or(0);
        }

        fn clear(&mut self) {
            self.0.lock().cleared += 1;
        }
    }

    fn analyzer() -> (SignalAnalyzer<RecordingRenderer>, Arc<Mutex<Recording>>) {
        let log = Arc::new(Mutex::new(Recording::default()));
        let mut analyzer = SignalAnalyzer::new(RecordingRenderer(Arc::clone(&log)));
        analyzer.set_frame_interval(Duration::from_millis(5));
        (analyzer, log)
    }

    #[test]
    fn connect_resumes_graph() {
        let (mut analyzer, _) = analyzer();
        assert_eq!(analyzer.processing_state(), ProcessingState::Suspended);

        let stream: StreamHandle = Arc::new(TestStream {
            tap: Some(Arc::new(ConstantTap(0.5))),
        });
        analyzer.connect(&stream).unwrap();

        assert_eq!(analyzer.processing_state(), ProcessingState::Running);
        assert!(analyzer.is_connected());
    }

    #[test]
    fn connect_without_audio_fails_and_drops_previous_source() {
        let (mut analyzer, _) = analyzer();
        let with_audio: StreamHandle = Arc::new(TestStream {
            tap: Some(Arc::new(ConstantTap(0.5))),
        });
        let video_only: StreamHandle = Arc::new(TestStream { tap: None });

        analyzer.connect(&with_audio).unwrap();
        assert_eq!(analyzer.connect(&video_only), Err(CaptureError::NoAudioTrack));
        assert!(!analyzer.is_connected());
    }

    #[test]
    fn loop_renders_and_stop_clears() {
        let (mut analyzer, log) = analyzer();
        let stream: StreamHandle = Arc::new(TestStream {
            tap: Some(Arc::new(ConstantTap(0.9))),
        });
        analyzer.connect(&stream).unwrap();

        analyzer.start().unwrap();
        thread::sleep(Duration::from_millis(80));
        assert!(analyzer.is_running());
        analyzer.stop();

        let r = log.lock();
        assert!(r.frames >= 2);
        assert!(r.last_max > 0);
        assert_eq!(r.cleared, 1);
        assert!(!analyzer.is_running());
    }

    #[test]
    fn rejects_invalid_settings() {
        let log = Arc::new(Mutex::new(Recording::default()));
        let settings = AnalyserSettings {
            fft_size: 100,
            ..AnalyserSettings::default()
        };
        let result = SignalAnalyzer::with_settings(RecordingRenderer(log), settings);
        assert!(matches!(result.err(), Some(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn restart_does_not_double_schedule() {
        let (mut analyzer, log) = analyzer();

        analyzer.start().unwrap();
        analyzer.start().unwrap();
        assert_eq!(log.lock().cleared, 1);

        analyzer.stop();
        analyzer.stop();
        assert_eq!(log.lock().cleared, 2);
    }
}
