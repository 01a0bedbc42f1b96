use crate::models::error::RecorderError;

/// Format-specific strategy that turns a PCM stream into a container.
///
/// The encoder owns its sink. Calls arrive on the acquisition thread in the
/// order `on_recording_started`, any number of `on_samples`, then
/// `on_recording_finished`, which also closes the sink.
pub trait ContainerEncoder: Send {
    /// Write a provisional header.
    fn on_recording_started(&mut self) -> Result<(), RecorderError>;

    /// Append PCM. `samples` is only valid for the duration of the call.
    fn on_samples(&mut self, samples: &[u8]) -> Result<(), RecorderError>;

    /// Backpatch the header and close the sink. Repeated calls are no-ops.
    fn on_recording_finished(&mut self) -> Result<(), RecorderError>;

    /// PCM bytes written since `on_recording_started`.
    fn payload_bytes(&self) -> u64;

    /// Hex digest of the payload, if this encoder tracks one.
    fn payload_checksum(&self) -> Option<String> {
        None
    }
}

impl ContainerEncoder for Box<dyn ContainerEncoder> {
    fn on_recording_started(&mut self) -> Result<(), RecorderError> {
        (**self).on_recording_started()
    }

    fn on_samples(&mut self, samples: &[u8]) -> Result<(), RecorderError> {
        (**self).on_samples(samples)
    }

    fn on_recording_finished(&mut self) -> Result<(), RecorderError> {
        (**self).on_recording_finished()
    }

    fn payload_bytes(&self) -> u64 {
        (**self).payload_bytes()
    }

    fn payload_checksum(&self) -> Option<String> {
        (**self).payload_checksum()
    }
}
