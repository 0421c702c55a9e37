//! # media-capture-core
//!
//! Platform-agnostic media capture core library.
//!
//! Provides the recording-session lifecycle (preview, record, switch device,
//! stop), fragment buffering, output format negotiation, real-time audio
//! level and spectrum analysis, and local persistence of finished
//! recordings. Hosts plug in through the `CaptureHost`, `EncoderFactory` and
//! `PreviewSurface` traits.
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/       ← CaptureHost, MediaStream, MediaTrack, SampleTap, EncoderFactory, ChunkedEncoder, PreviewSurface, SessionDelegate
//! ├── models/       ← CaptureError, RecordingState, RecorderConfiguration, MediaConstraints, RecordingResult, etc.
//! ├── processing/   ← FragmentBuffer, Completion, format negotiation
//! ├── session/      ← CaptureSession (lifecycle state machine), capability queries
//! ├── analysis/     ← SignalAnalyzer, FrequencyAnalyser, LevelMeter, SpectrumRenderer
//! └── storage/      ← save_recording, metadata sidecar
//! ```

pub mod analysis;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use analysis::{AudioVisualizer, LevelIndicator, SignalAnalyzer};
pub use models::config::RecorderConfiguration;
pub use models::error::CaptureError;
pub use models::media_models::{
    DeviceKind, DeviceList, EncoderStatus, MediaConstraints, MediaDeviceInfo, TrackConstraint, TrackKind,
};
pub use models::recording_result::{RecordingMetadata, RecordingResult, RecordingStats};
pub use models::state::{RecordingState, SessionEvent};
pub use processing::fragment_buffer::FragmentBuffer;
pub use session::capabilities::{is_supported, list_devices};
pub use session::recorder::CaptureSession;
pub use storage::local_file::save_recording;
pub use traits::capture_host::{CaptureHost, MediaStream, MediaTrack, SampleTap, StreamHandle};
pub use traits::encoder::{ChunkedEncoder, EncoderFactory, EncoderOptions, FragmentCallback, StopCallback};
pub use traits::preview_surface::PreviewSurface;
pub use traits::session_delegate::SessionDelegate;
