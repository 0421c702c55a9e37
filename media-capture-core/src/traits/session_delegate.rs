use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;

/// Event delegate for capture session notifications.
///
/// `on_fragment` is called from the encoder's thread; the others from the
/// thread driving the session. Implementations should marshal to the UI
/// thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: RecordingState);

    /// Called for every fragment appended to the buffer.
    fn on_fragment(&self, _size_bytes: usize, _total_bytes: u64) {}

    /// Called when an operation fails.
    fn on_error(&self, error: &CaptureError);

    /// Called when a recording is finalized.
    fn on_recording_finished(&self, result: &RecordingResult);
}
