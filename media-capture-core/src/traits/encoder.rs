use std::sync::Arc;
use std::time::Duration;

use crate::models::error::CaptureError;
use crate::models::media_models::EncoderStatus;
use crate::traits::capture_host::StreamHandle;

/// Callback invoked with each encoded fragment, in emission order.
///
/// Fires on the encoder's own thread, once per flush interval and once more
/// when the encoder finalizes. Fragments may be empty.
pub type FragmentCallback = Arc<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// Callback invoked after the encoder has flushed all buffered data on stop.
pub type StopCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Options handed to the encoding engine when an encoder is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub mime_type: String,
    pub audio_bits_per_second: u32,
    pub video_bits_per_second: u32,
}

/// A chunked-recording engine bound to one stream.
pub trait ChunkedEncoder: Send {
    /// Begin encoding, emitting accumulated data at least every `timeslice`.
    fn start(
        &mut self,
        timeslice: Duration,
        on_data: FragmentCallback,
        on_stop: StopCallback,
    ) -> Result<(), CaptureError>;

    /// Ask the encoder to finalize. Completion is signalled through the
    /// `on_stop` callback, after the last fragment has been delivered.
    fn request_stop(&mut self) -> Result<(), CaptureError>;

    fn status(&self) -> EncoderStatus;
}

/// The host's chunked-encoding engine.
pub trait EncoderFactory: Send + Sync {
    /// Whether the host exposes an encoding engine at all.
    fn is_available(&self) -> bool;

    /// Capability probe for an output format.
    fn supports_format(&self, mime_type: &str) -> bool;

    /// Create an encoder bound to `stream`.
    fn create(
        &self,
        stream: StreamHandle,
        options: &EncoderOptions,
    ) -> Result<Box<dyn ChunkedEncoder>, CaptureError>;
}
