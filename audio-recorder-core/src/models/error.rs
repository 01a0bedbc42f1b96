use thiserror::Error;

/// Errors that can occur while recording.
///
/// Only `AlreadyStopped` is harmless to the session; every other variant
/// raised from the acquisition thread terminates it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("recorder already stopped")]
    AlreadyStopped,

    #[error("invalid capture format: {0}")]
    InvalidFormat(String),

    #[error("capture read failed with code {code}")]
    CaptureRead { code: i32 },

    #[error("container write failed at offset {offset} ({len} bytes): {reason}")]
    ContainerWrite { offset: u64, len: usize, reason: String },

    #[error("capture device error: {0}")]
    Device(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl RecorderError {
    /// Whether this error ends the recording session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AlreadyStopped)
    }

    pub(crate) fn container_write(offset: u64, len: usize, err: std::io::Error) -> Self {
        Self::ContainerWrite {
            offset,
            len,
            reason: err.to_string(),
        }
    }
}
