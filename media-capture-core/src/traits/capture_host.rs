use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::media_models::{MediaConstraints, MediaDeviceInfo, TrackKind};

/// Shared handle to a live capture stream.
///
/// The session owns the stream; the preview surface and the encoder hold
/// clones of the handle but never stop its tracks.
pub type StreamHandle = Arc<dyn MediaStream>;

/// One hardware or software track inside a stream.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Human readable device label, empty before permission is granted.
    fn label(&self) -> &str;

    /// Whether the track still holds its device.
    fn is_live(&self) -> bool;

    /// Release the underlying device. Idempotent.
    fn stop(&self);
}

/// Source of the most recent time-domain audio samples of a stream.
///
/// Plays the role of a media-stream source node feeding an analysis graph.
pub trait SampleTap: Send + Sync {
    /// Sample rate of the delivered audio in Hz.
    fn sample_rate(&self) -> f32;

    /// Fill `out` with the latest samples (mono, `[-1.0, 1.0]`), oldest first.
    /// Returns the number of samples written.
    fn read_latest(&self, out: &mut [f32]) -> usize;
}

/// A live capture stream produced by a `CaptureHost`.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// Tap into the audio of this stream, if it carries any.
    fn audio_tap(&self) -> Option<Arc<dyn SampleTap>> {
        None
    }

    fn has_kind(&self, kind: TrackKind) -> bool {
        self.tracks().iter().any(|t| t.kind() == kind)
    }

    /// Stop every track, releasing the hardware behind the stream.
    fn stop_tracks(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// Interface for the host's device-permission and acquisition API.
pub trait CaptureHost: Send + Sync {
    /// Whether the host exposes a capture-acquisition API at all.
    fn is_available(&self) -> bool;

    /// Acquire a stream matching `constraints`.
    ///
    /// Fails with `PermissionDenied`, `DeviceNotAvailable` or
    /// `AcquisitionFailed` when the request cannot be satisfied.
    fn acquire(&self, constraints: &MediaConstraints) -> Result<StreamHandle, CaptureError>;

    /// List the devices known to the host. Labels may be redacted until a
    /// stream has been acquired once.
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CaptureError>;
}
