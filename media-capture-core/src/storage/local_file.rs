use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::processing::format::extension_for_mime;
use crate::storage::metadata::write_metadata;

/// Save a finalized recording into `directory`.
///
/// The file is named `{name}.{ext}` with the extension derived from the
/// result's MIME type, unless `name` already carries an extension. A JSON
/// sidecar with a SHA-256 checksum is written next to it.
pub fn save_recording(result: &RecordingResult, directory: &Path, name: &str) -> Result<PathBuf, CaptureError> {
    let name = sanitize_file_name(name);
    if name.is_empty() {
        return Err(CaptureError::StorageError("empty file name".into()));
    }

    fs::create_dir_all(directory)
        .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;

    let file_name = if Path::new(&name).extension().is_some() {
        name
    } else {
        format!("{}.{}", name, extension_for_mime(&result.mime_type))
    };
    let path = directory.join(&file_name);

    fs::write(&path, &result.data)
        .map_err(|e| CaptureError::StorageError(format!("failed to write recording: {}", e)))?;

    let checksum = hex_encode(&Sha256::digest(&result.data));
    let metadata = RecordingMetadata::for_result(result, &file_name, &checksum);
    write_metadata(&metadata, &path)?;

    log::info!("Saved recording {} ({} bytes) to {}", result.id, result.size_bytes, path.display());
    Ok(path)
}

/// Compute the SHA-256 hex digest of a saved file.
pub fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data =
        fs::read(path).map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&Sha256::digest(&data)))
}

fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
