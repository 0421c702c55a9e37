use thiserror::Error;

use super::state::{RecordingState, SessionEvent};

/// Errors that can occur during capture, recording and analysis operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("stream acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("no active recording")]
    NoActiveRecording,

    #[error("finalize failed: {0}")]
    FinalizeFailed(String),

    #[error("encoder failed: {0}")]
    EncoderFailed(String),

    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    #[error("capture or encoding API not available in this environment")]
    UnsupportedEnvironment,

    #[error("stream has no audio track")]
    NoAudioTrack,

    #[error("invalid transition: {event:?} while {from:?}")]
    InvalidTransition {
        from: RecordingState,
        event: SessionEvent,
    },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("timeout")]
    Timeout,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Whether this error comes from the host denying or failing to satisfy
    /// a stream request.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::DeviceNotAvailable
                | Self::AcquisitionFailed(_)
                | Self::UnsupportedEnvironment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_family() {
        assert!(CaptureError::PermissionDenied.is_acquisition_failure());
        assert!(CaptureError::AcquisitionFailed("busy".into()).is_acquisition_failure());
        assert!(!CaptureError::NoActiveRecording.is_acquisition_failure());
        assert!(!CaptureError::FinalizeFailed("boom".into()).is_acquisition_failure());
    }

    #[test]
    fn invalid_transition_message() {
        let err = CaptureError::InvalidTransition {
            from: RecordingState::Recording,
            event: SessionEvent::BeginRecording,
        };
        assert_eq!(err.to_string(), "invalid transition: BeginRecording while Recording");
    }
}
