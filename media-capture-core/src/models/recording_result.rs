use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::RecordingState;

/// Result returned when a recording is finalized.
///
/// Owned by the caller, who decides whether and where to persist it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub id: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub duration_ms: u64,
    pub size_bytes: u64,
}

impl RecordingResult {
    pub fn new(data: Vec<u8>, mime_type: &str, duration_ms: u64) -> Self {
        let size_bytes = data.len() as u64;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            data,
            mime_type: mime_type.to_string(),
            duration_ms,
            size_bytes,
        }
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingStats {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub state: RecordingState,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Metadata written next to a saved recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub duration_ms: u64,
    pub size_bytes: u64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn for_result(result: &RecordingResult, file_name: &str, checksum: &str) -> Self {
        Self {
            id: result.id.clone(),
            file_name: file_name.to_string(),
            mime_type: result.mime_type.clone(),
            duration_ms: result.duration_ms,
            size_bytes: result.size_bytes,
            checksum: checksum.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_data() {
        let result = RecordingResult::new(vec![1, 2, 3, 4], "video/webm", 1500);
        assert_eq!(result.size_bytes, 4);
        assert_eq!(result.mime_type, "video/webm");
        assert!(!result.id.is_empty());
    }

    #[test]
    fn stats_round_trip_json() {
        let stats = RecordingStats {
            started_at: Some(Utc::now()),
            ended_at: None,
            duration_ms: 42,
            state: RecordingState::Recording,
            mime_type: "video/webm".into(),
            size_bytes: 7,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"state\":\"recording\""));
        let back: RecordingStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
