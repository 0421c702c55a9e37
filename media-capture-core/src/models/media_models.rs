use serde::{Deserialize, Serialize};

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Requested capture for one track kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TrackConstraint {
    /// Do not capture this kind.
    #[default]
    Disabled,
    /// Capture from the default device.
    Any,
    /// Capture from a specific device.
    Device { device_id: String },
}

impl TrackConstraint {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Device { device_id } => Some(device_id),
            _ => None,
        }
    }
}

/// Desired audio/video capture parameters passed to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: TrackConstraint,
    pub video: TrackConstraint,
}

impl MediaConstraints {
    pub fn audio_only() -> Self {
        Self {
            audio: TrackConstraint::Any,
            video: TrackConstraint::Disabled,
        }
    }

    pub fn video_only() -> Self {
        Self {
            audio: TrackConstraint::Disabled,
            video: TrackConstraint::Any,
        }
    }

    pub fn audio_video() -> Self {
        Self {
            audio: TrackConstraint::Any,
            video: TrackConstraint::Any,
        }
    }

    pub fn with_audio_device(mut self, device_id: impl Into<String>) -> Self {
        self.audio = TrackConstraint::Device {
            device_id: device_id.into(),
        };
        self
    }

    pub fn with_video_device(mut self, device_id: impl Into<String>) -> Self {
        self.video = TrackConstraint::Device {
            device_id: device_id.into(),
        };
        self
    }

    /// Whether any track kind is requested at all.
    pub fn is_empty(&self) -> bool {
        !self.audio.is_enabled() && !self.video.is_enabled()
    }

    pub fn for_kind(&self, kind: TrackKind) -> &TrackConstraint {
        match kind {
            TrackKind::Audio => &self.audio,
            TrackKind::Video => &self.video,
        }
    }
}

/// Kind of a capture or playback device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
    AudioOutput,
}

impl DeviceKind {
    /// The track kind an input device produces.
    pub fn track_kind(&self) -> Option<TrackKind> {
        match self {
            Self::AudioInput => Some(TrackKind::Audio),
            Self::VideoInput => Some(TrackKind::Video),
            Self::AudioOutput => None,
        }
    }
}

/// A device known to the host.
///
/// Labels may be empty until the user has granted capture permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub label: String,
    pub kind: DeviceKind,
    pub group_id: Option<String>,
}

/// Input devices split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub audio_inputs: Vec<MediaDeviceInfo>,
    pub video_inputs: Vec<MediaDeviceInfo>,
}

impl DeviceList {
    pub fn from_devices(devices: Vec<MediaDeviceInfo>) -> Self {
        let (audio_inputs, rest): (Vec<_>, Vec<_>) = devices
            .into_iter()
            .partition(|d| d.kind == DeviceKind::AudioInput);
        let video_inputs = rest
            .into_iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .collect();
        Self {
            audio_inputs,
            video_inputs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio_inputs.is_empty() && self.video_inputs.is_empty()
    }
}

/// Live status reported by a chunked encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderStatus {
    Inactive,
    Recording,
    Paused,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, kind: DeviceKind) -> MediaDeviceInfo {
        MediaDeviceInfo {
            device_id: id.into(),
            label: format!("{} label", id),
            kind,
            group_id: None,
        }
    }

    #[test]
    fn device_list_splits_by_kind() {
        let list = DeviceList::from_devices(vec![
            device("mic1", DeviceKind::AudioInput),
            device("cam1", DeviceKind::VideoInput),
            device("spk1", DeviceKind::AudioOutput),
            device("cam2", DeviceKind::VideoInput),
        ]);

        assert_eq!(list.audio_inputs.len(), 1);
        assert_eq!(list.video_inputs.len(), 2);
        assert_eq!(list.video_inputs[1].device_id, "cam2");
    }

    #[test]
    fn constraint_builders() {
        let c = MediaConstraints::audio_video().with_video_device("cam2");
        assert_eq!(c.audio, TrackConstraint::Any);
        assert_eq!(c.video.device_id(), Some("cam2"));
        assert!(!c.is_empty());
        assert!(MediaConstraints::default().is_empty());
        assert!(!MediaConstraints::video_only().audio.is_enabled());
    }

    #[test]
    fn constraints_json_shape() {
        let c = MediaConstraints::audio_only().with_video_device("cam1");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["audio"]["type"], "any");
        assert_eq!(json["video"]["type"], "device");
        assert_eq!(json["video"]["device_id"], "cam1");
    }
}
