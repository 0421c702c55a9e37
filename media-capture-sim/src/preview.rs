use parking_lot::Mutex;

use media_capture_core::models::error::CaptureError;
use media_capture_core::traits::capture_host::StreamHandle;
use media_capture_core::traits::preview_surface::PreviewSurface;

#[derive(Default)]
struct PreviewState {
    source: Option<StreamHandle>,
    muted: bool,
    plays: usize,
    fail_next_play: bool,
}

/// Preview surface that records what it was asked to show.
#[derive(Default)]
pub struct SimulatedPreview {
    state: Mutex<PreviewState>,
}

impl SimulatedPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `play` call fail, as an autoplay policy would.
    pub fn fail_next_play(&self) {
        self.state.lock().fail_next_play = true;
    }

    /// ID of the stream currently attached.
    pub fn source_id(&self) -> Option<String> {
        self.state.lock().source.as_ref().map(|s| s.id().to_string())
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    /// Number of successful `play` calls.
    pub fn plays(&self) -> usize {
        self.state.lock().plays
    }
}

impl PreviewSurface for SimulatedPreview {
    fn attach(&self, stream: Option<StreamHandle>) {
        self.state.lock().source = stream;
    }

    fn source(&self) -> Option<StreamHandle> {
        self.state.lock().source.clone()
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn play(&self) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        if state.source.is_none() {
            return Err(CaptureError::PlaybackFailed("no source attached".into()));
        }
        if std::mem::take(&mut state.fail_next_play) {
            return Err(CaptureError::PlaybackFailed("playback was blocked".into()));
        }
        state.plays += 1;
        Ok(())
    }
}
