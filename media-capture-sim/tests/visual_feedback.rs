use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use media_capture_core::analysis::{
    LevelDisplay, LevelMeter, ProcessingState, SpectrumCanvas, SpectrumFrame, SpectrumRenderer,
    Viewport,
};
use media_capture_core::{
    AudioVisualizer, CaptureError, CaptureHost, CaptureSession, LevelIndicator, MediaConstraints,
    RecorderConfiguration,
};
use media_capture_sim::{SimulatedEncoderFactory, SimulatedHost};

#[derive(Default)]
struct MeterBar(Mutex<Vec<f32>>);

impl LevelDisplay for MeterBar {
    fn set_level(&self, percent: f32) {
        self.0.lock().push(percent);
    }
}

#[derive(Default)]
struct Canvas {
    frames: Mutex<Vec<SpectrumFrame>>,
    clears: Mutex<usize>,
}

impl SpectrumCanvas for Canvas {
    fn draw(&self, frame: &SpectrumFrame) {
        self.frames.lock().push(frame.clone());
    }

    fn clear(&self, _width: u32, _height: u32) {
        *self.clears.lock() += 1;
    }
}

#[test]
fn level_indicator_follows_recording_stream() {
    let mut session = CaptureSession::new(
        SimulatedHost::default(),
        SimulatedEncoderFactory::default(),
        RecorderConfiguration::default(),
    )
    .unwrap();
    session.begin_recording(&MediaConstraints::audio_video()).unwrap();
    let stream = session.current_stream().unwrap();

    let bar = Arc::new(MeterBar::default());
    let mut indicator = LevelIndicator::new(LevelMeter::new(bar.clone()));
    indicator.set_frame_interval(Duration::from_millis(5));
    indicator.connect(&stream).unwrap();
    indicator.start().unwrap();

    thread::sleep(Duration::from_millis(120));
    assert_eq!(indicator.processing_state(), ProcessingState::Running);
    assert!(indicator.with_renderer(|m| m.level()) > 0.0);

    indicator.stop();
    assert_eq!(bar.0.lock().last().copied(), Some(0.0));
    assert!(bar.0.lock().iter().all(|&l| (0.0..=100.0).contains(&l)));

    session.stop_recording().unwrap();
}

#[test]
fn visualizers_run_independently() {
    let host = SimulatedHost::default();
    let stream = host.acquire(&MediaConstraints::audio_only()).unwrap();

    let first_canvas = Arc::new(Canvas::default());
    let second_canvas = Arc::new(Canvas::default());
    let mut first = AudioVisualizer::new(SpectrumRenderer::new(
        first_canvas.clone(),
        Viewport::new(320.0, 80.0, 2.0),
    ));
    let mut second = AudioVisualizer::new(SpectrumRenderer::new(
        second_canvas.clone(),
        Viewport::new(320.0, 80.0, 1.0),
    ));
    first.set_frame_interval(Duration::from_millis(5));
    second.set_frame_interval(Duration::from_millis(5));

    first.connect(&stream).unwrap();
    second.connect(&stream).unwrap();
    first.start().unwrap();
    second.start().unwrap();
    thread::sleep(Duration::from_millis(60));

    first.stop();
    assert!(!first.is_running());
    assert!(second.is_running());

    let drawn = second_canvas.frames.lock().len();
    thread::sleep(Duration::from_millis(40));
    assert!(second_canvas.frames.lock().len() > drawn);
    second.stop();

    assert_eq!(*first_canvas.clears.lock(), 1);
    let frames = first_canvas.frames.lock();
    let last = frames.last().unwrap();
    assert_eq!((last.width, last.height), (640, 160));
    assert!(!last.bars.is_empty());
}

#[test]
fn video_only_stream_has_nothing_to_analyse() {
    let host = SimulatedHost::default();
    let stream = host.acquire(&MediaConstraints::video_only()).unwrap();

    let mut indicator = LevelIndicator::new(LevelMeter::detached());
    assert_eq!(indicator.connect(&stream), Err(CaptureError::NoAudioTrack));
    assert!(!indicator.is_connected());
}

#[test]
fn resize_applies_to_following_frames() {
    let host = SimulatedHost::default();
    let stream = host.acquire(&MediaConstraints::audio_only()).unwrap();
    let canvas = Arc::new(Canvas::default());

    let mut visualizer = AudioVisualizer::new(SpectrumRenderer::new(
        canvas.clone(),
        Viewport::new(100.0, 40.0, 1.0),
    ));
    visualizer.set_frame_interval(Duration::from_millis(5));
    visualizer.connect(&stream).unwrap();
    visualizer.resize(Viewport::new(200.0, 50.0, 2.0));
    visualizer.start().unwrap();
    thread::sleep(Duration::from_millis(40));
    visualizer.stop();

    let frames = canvas.frames.lock();
    assert!(frames.iter().all(|f| (f.width, f.height) == (400, 100)));
}
