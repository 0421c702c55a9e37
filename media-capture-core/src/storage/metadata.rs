use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

const SIDECAR_SUFFIX: &str = ".metadata.json";

/// Path of the sidecar for a saved recording: the full file name with
/// `.metadata.json` appended, e.g. `take.webm` → `take.webm.metadata.json`.
pub fn sidecar_path(recording_path: &Path) -> PathBuf {
    let mut name = recording_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    recording_path.with_file_name(name)
}

/// Store `metadata` as pretty-printed JSON next to the recording.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = sidecar_path(recording_path);
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to encode sidecar: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write {}: {}", path.display(), e)))?;
    log::debug!("Wrote sidecar {}", path.display());
    Ok(path)
}

/// Load the sidecar of a saved recording.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let path = sidecar_path(recording_path);
    let bytes = fs::read(&path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CaptureError::StorageError(format!("malformed sidecar {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_keeps_recording_extension() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/out/take.webm")),
            PathBuf::from("/tmp/out/take.webm.metadata.json")
        );
        assert_eq!(
            sidecar_path(Path::new("take")),
            PathBuf::from("take.metadata.json")
        );
    }

    #[test]
    fn malformed_sidecar_is_a_storage_error() {
        let dir = std::env::temp_dir().join(format!("media_capture_sidecar_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let recording = dir.join("broken.webm");
        fs::write(sidecar_path(&recording), b"{ not json").unwrap();

        assert!(matches!(
            read_metadata(&recording),
            Err(CaptureError::StorageError(_))
        ));
        assert!(matches!(
            read_metadata(&dir.join("missing.webm")),
            Err(CaptureError::StorageError(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
