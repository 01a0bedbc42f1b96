use serde::{Deserialize, Serialize};

use super::format::{CaptureFormat, ContainerFormat};

/// Outcome of a recording session that finalized its container.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub format: CaptureFormat,
    pub payload_bytes: u64,
    pub duration_secs: f64,
    /// SHA-256 hex digest of the PCM payload, if the encoder tracks one.
    pub checksum: Option<String>,
}

impl RecordingSummary {
    pub fn new(format: CaptureFormat, payload_bytes: u64, checksum: Option<String>) -> Self {
        Self {
            format,
            payload_bytes,
            duration_secs: format.duration_secs(payload_bytes),
            checksum,
        }
    }
}

/// Metadata stored alongside a recording.
///
/// Serializable for a JSON sidecar next to the recording file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub container: ContainerFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub payload_bytes: u64,
    pub duration_secs: f64,
    pub checksum: Option<String>,
}

impl RecordingMetadata {
    pub fn from_summary(container: ContainerFormat, summary: &RecordingSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            container,
            sample_rate: summary.format.sample_rate(),
            channels: summary.format.channels(),
            bits_per_sample: summary.format.bits_per_sample(),
            payload_bytes: summary.payload_bytes,
            duration_secs: summary.duration_secs,
            checksum: summary.checksum.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn summary_duration_follows_byte_rate() {
        let format = CaptureFormat::new(16000, 1, 16).unwrap();
        let summary = RecordingSummary::new(format, 48000, None);
        assert_relative_eq!(summary.duration_secs, 1.5);
    }

    #[test]
    fn metadata_copies_format() {
        let format = CaptureFormat::new(22050, 2, 8).unwrap();
        let summary = RecordingSummary::new(format, 44100, Some("abc".into()));
        let metadata = RecordingMetadata::from_summary(ContainerFormat::Wav, &summary);

        assert_eq!(metadata.sample_rate, 22050);
        assert_eq!(metadata.channels, 2);
        assert_eq!(metadata.bits_per_sample, 8);
        assert_eq!(metadata.checksum.as_deref(), Some("abc"));
        assert_relative_eq!(metadata.duration_secs, 1.0);
        assert!(uuid::Uuid::parse_str(&metadata.id).is_ok());
    }
}
