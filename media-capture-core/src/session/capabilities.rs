use crate::models::media_models::{DeviceList, MediaConstraints};
use crate::traits::capture_host::CaptureHost;
use crate::traits::encoder::EncoderFactory;

/// Whether the environment can both acquire streams and encode them.
pub fn is_supported<H, F>(host: &H, encoders: &F) -> bool
where
    H: CaptureHost + ?Sized,
    F: EncoderFactory + ?Sized,
{
    host.is_available() && encoders.is_available()
}

/// List audio and video input devices.
///
/// Returns empty lists unless the environment is fully supported (see
/// `is_supported`). A throwaway audio+video stream is acquired first so
/// hosts that redact device labels until permission is granted report them.
/// Any failure yields empty lists.
pub fn list_devices<H, F>(host: &H, encoders: &F) -> DeviceList
where
    H: CaptureHost + ?Sized,
    F: EncoderFactory + ?Sized,
{
    if !is_supported(host, encoders) {
        log::warn!("Cannot list devices: capture or encoding API not available");
        return DeviceList::default();
    }

    match host.acquire(&MediaConstraints::audio_video()) {
        Ok(stream) => stream.stop_tracks(),
        Err(e) => {
            log::warn!("Error unlocking devices: {}", e);
            return DeviceList::default();
        }
    }

    match host.enumerate_devices() {
        Ok(devices) => DeviceList::from_devices(devices),
        Err(e) => {
            log::warn!("Error getting devices: {}", e);
            DeviceList::default()
        }
    }
}
