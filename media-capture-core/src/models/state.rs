use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// inactive --begin_recording--> recording
/// recording --switch_device--> recording   (encoder recreated)
/// inactive --switch_device--> inactive     (no encoder change)
/// recording --stop_recording--> inactive
/// ```
///
/// `Paused` is part of the domain but no transition reaches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    #[default]
    Inactive,
    Recording,
    Paused,
}

/// Operations that drive the recording state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    BeginRecording,
    SwitchDevice,
    StopRecording,
}

impl RecordingState {
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Inactive)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Next state for `event`, or `InvalidTransition` if the pair is not in
    /// the transition table.
    pub fn transition(self, event: SessionEvent) -> Result<RecordingState, CaptureError> {
        use RecordingState::*;
        use SessionEvent::*;

        match (self, event) {
            (Inactive, BeginRecording) => Ok(Recording),
            (Recording, SwitchDevice) => Ok(Recording),
            (Inactive, SwitchDevice) => Ok(Inactive),
            (Recording, StopRecording) => Ok(Inactive),
            (from, event) => Err(CaptureError::InvalidTransition { from, event }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Recording => "recording",
            Self::Paused => "paused",
        }
    }
}
