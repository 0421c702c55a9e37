//! Simulated device-permission and acquisition API.
//!
//! Holds a fixed device table and hands out `SimulatedStream`s. Permission,
//! availability and per-device busy flags can be flipped at runtime so tests
//! can drive every failure path of the session.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use media_capture_core::models::error::CaptureError;
use media_capture_core::models::media_models::{
    DeviceKind, MediaConstraints, MediaDeviceInfo, TrackConstraint, TrackKind,
};
use media_capture_core::traits::capture_host::{CaptureHost, MediaStream, StreamHandle};

use crate::stream::{SimulatedStream, SimulatedTrack, SineTap};

/// Static description of the simulated environment.
#[derive(Debug, Clone)]
pub struct SimHostConfig {
    /// Whether the acquisition API exists at all.
    pub available: bool,
    pub permission_granted: bool,
    pub devices: Vec<MediaDeviceInfo>,
    /// Hide device labels until the first successful acquisition.
    pub redact_labels: bool,
    /// Tone carried by audio taps, in Hz.
    pub tone_hz: f32,
    pub tone_amplitude: f32,
    pub sample_rate: f32,
}

impl Default for SimHostConfig {
    fn default() -> Self {
        Self {
            available: true,
            permission_granted: true,
            devices: vec![
                sim_device("mic1", "Built-in Microphone", DeviceKind::AudioInput),
                sim_device("cam1", "Integrated Camera", DeviceKind::VideoInput),
                sim_device("cam2", "USB Camera", DeviceKind::VideoInput),
                sim_device("spk1", "Speakers", DeviceKind::AudioOutput),
            ],
            redact_labels: true,
            tone_hz: 1000.0,
            tone_amplitude: 0.5,
            sample_rate: 48000.0,
        }
    }
}

impl SimHostConfig {
    /// An environment without any capture API.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }
}

/// Build a device entry with a group ID derived from the device ID.
pub fn sim_device(id: &str, label: &str, kind: DeviceKind) -> MediaDeviceInfo {
    MediaDeviceInfo {
        device_id: id.to_string(),
        label: label.to_string(),
        kind,
        group_id: Some(format!("group-{}", id)),
    }
}

struct HostState {
    permission_granted: bool,
    labels_unlocked: bool,
    busy: HashSet<String>,
    streams: Vec<Arc<SimulatedStream>>,
    acquisitions: usize,
}

struct HostInner {
    config: SimHostConfig,
    state: Mutex<HostState>,
}

/// In-process `CaptureHost`.
///
/// Cheap to clone; clones share devices, flags and the stream log.
#[derive(Clone)]
pub struct SimulatedHost {
    inner: Arc<HostInner>,
}

impl SimulatedHost {
    pub fn new(config: SimHostConfig) -> Self {
        let state = HostState {
            permission_granted: config.permission_granted,
            labels_unlocked: !config.redact_labels,
            busy: HashSet::new(),
            streams: Vec::new(),
            acquisitions: 0,
        };
        Self {
            inner: Arc::new(HostInner {
                config,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn set_permission(&self, granted: bool) {
        self.inner.state.lock().permission_granted = granted;
    }

    /// Mark a device as held by another application.
    pub fn set_busy(&self, device_id: &str, busy: bool) {
        let mut state = self.inner.state.lock();
        if busy {
            state.busy.insert(device_id.to_string());
        } else {
            state.busy.remove(device_id);
        }
    }

    /// Number of successful acquisitions so far.
    pub fn acquisitions(&self) -> usize {
        self.inner.state.lock().acquisitions
    }

    /// Every stream handed out, oldest first.
    pub fn streams(&self) -> Vec<Arc<SimulatedStream>> {
        self.inner.state.lock().streams.clone()
    }

    /// Tracks across all handed-out streams that still hold a device.
    pub fn live_track_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .streams
            .iter()
            .map(|s| s.live_track_count())
            .sum()
    }

    fn resolve(
        &self,
        state: &HostState,
        kind: TrackKind,
        constraint: &TrackConstraint,
    ) -> Result<Option<MediaDeviceInfo>, CaptureError> {
        let mut candidates = self
            .inner
            .config
            .devices
            .iter()
            .filter(|d| d.kind.track_kind() == Some(kind));

        let device = match constraint {
            TrackConstraint::Disabled => return Ok(None),
            TrackConstraint::Any => candidates.next(),
            TrackConstraint::Device { device_id } => candidates.find(|d| &d.device_id == device_id),
        };

        let device = device.ok_or(CaptureError::DeviceNotAvailable)?;
        if state.busy.contains(&device.device_id) {
            return Err(CaptureError::AcquisitionFailed(format!(
                "device {} is in use",
                device.device_id
            )));
        }
        Ok(Some(device.clone()))
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new(SimHostConfig::default())
    }
}

impl CaptureHost for SimulatedHost {
    fn is_available(&self) -> bool {
        self.inner.config.available
    }

    fn acquire(&self, constraints: &MediaConstraints) -> Result<StreamHandle, CaptureError> {
        if !self.inner.config.available {
            return Err(CaptureError::UnsupportedEnvironment);
        }
        if constraints.is_empty() {
            return Err(CaptureError::AcquisitionFailed(
                "at least one of audio or video must be requested".into(),
            ));
        }

        let mut state = self.inner.state.lock();
        if !state.permission_granted {
            return Err(CaptureError::PermissionDenied);
        }

        let mut tracks = Vec::new();
        let mut tap = None;
        for kind in [TrackKind::Audio, TrackKind::Video] {
            if let Some(device) = self.resolve(&state, kind, constraints.for_kind(kind))? {
                if kind == TrackKind::Audio {
                    let config = &self.inner.config;
                    tap = Some(Arc::new(SineTap::new(
                        config.tone_hz,
                        config.tone_amplitude,
                        config.sample_rate,
                    )));
                }
                tracks.push(Arc::new(SimulatedTrack::new(kind, &device.device_id, &device.label)));
            }
        }

        let stream = Arc::new(SimulatedStream::new(tracks, tap));
        log::info!(
            "Acquired simulated stream {} on {:?}",
            stream.id(),
            stream.device_ids()
        );
        state.labels_unlocked = true;
        state.acquisitions += 1;
        state.streams.push(Arc::clone(&stream));
        Ok(stream)
    }

    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CaptureError> {
        if !self.inner.config.available {
            return Err(CaptureError::UnsupportedEnvironment);
        }

        let unlocked = self.inner.state.lock().labels_unlocked;
        Ok(self
            .inner
            .config
            .devices
            .iter()
            .cloned()
            .map(|mut d| {
                if !unlocked {
                    d.label.clear();
                }
                d
            })
            .collect())
    }
}
