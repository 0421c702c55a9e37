//! # media-capture-sim
//!
//! In-process simulated backend for media-capture-core.
//!
//! Provides:
//! - `SimulatedHost`: device table, permission and busy flags, stream acquisition
//! - `SimulatedEncoderFactory`: threaded chunked encoder with an emission ledger
//! - `SimulatedPreview`: preview surface that records attach/mute/play calls
//! - `SineTap`: audio tap producing a steady tone for the analysers
//!
//! ## Usage
//! ```ignore
//! use media_capture_core::{CaptureSession, MediaConstraints, RecorderConfiguration};
//! use media_capture_sim::{SimulatedEncoderFactory, SimulatedHost};
//!
//! let mut session = CaptureSession::new(
//!     SimulatedHost::default(),
//!     SimulatedEncoderFactory::default(),
//!     RecorderConfiguration::default(),
//! )?;
//! session.begin_recording(&MediaConstraints::audio_video())?;
//! let result = session.stop_recording()?;
//! ```

pub mod encoder;
pub mod host;
pub mod preview;
pub mod stream;

pub use encoder::{EmittedFragment, SimEncoderConfig, SimulatedEncoder, SimulatedEncoderFactory};
pub use host::{sim_device, SimHostConfig, SimulatedHost};
pub use preview::SimulatedPreview;
pub use stream::{SimulatedStream, SimulatedTrack, SineTap};
