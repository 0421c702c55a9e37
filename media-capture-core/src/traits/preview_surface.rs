use crate::models::error::CaptureError;
use crate::traits::capture_host::StreamHandle;

/// Write-only rendering sink that displays a live stream.
///
/// The session never owns the surface; it only writes the current stream
/// into it.
pub trait PreviewSurface: Send + Sync {
    /// Replace the displayed source. `None` detaches.
    fn attach(&self, stream: Option<StreamHandle>);

    /// The currently displayed source.
    fn source(&self) -> Option<StreamHandle>;

    fn set_muted(&self, muted: bool);

    /// Start or resume playback of the attached source.
    fn play(&self) -> Result<(), CaptureError>;
}
