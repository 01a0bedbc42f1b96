use crate::models::error::RecorderError;
use crate::models::format::CaptureFormat;

/// An opened audio input the recorder pulls PCM from.
///
/// Device discovery and format negotiation happen before a source reaches
/// the recorder; the recorder only consumes the negotiated format.
/// Implemented by:
/// - `StreamingSource` (push-style callbacks adapted to blocking reads)
/// - `audio_recorder_cpal::open_default_input` (cpal microphone)
pub trait CaptureSource: Send {
    fn sample_rate(&self) -> u32;

    fn channel_count(&self) -> u16;

    /// 8 or 16.
    fn bits_per_sample(&self) -> u16;

    /// Whether the device is currently delivering samples.
    fn is_capturing(&self) -> bool;

    fn start_capturing(&mut self) -> Result<(), RecorderError>;

    fn stop_capturing(&mut self) -> Result<(), RecorderError>;

    /// Free the device. Called exactly once, after the final `stop_capturing`.
    fn release(&mut self);

    /// Block until PCM is available and copy up to `buffer.len()` bytes into it.
    ///
    /// `Ok(0)` means nothing arrived yet; device failures are reported as
    /// `RecorderError::CaptureRead`.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RecorderError>;

    /// Smallest buffer in bytes the device accepts for `format`, or `None`
    /// when the format is unsupported.
    fn minimum_buffer_size(&self, format: &CaptureFormat) -> Option<usize>;

    /// Drop audio buffered while the recorder was paused. Called on the
    /// acquisition thread before the first read after a resume.
    fn discard_pending(&mut self) {}

    /// Called on the acquisition thread before capture starts.
    fn raise_thread_priority(&mut self) {}

    /// Called on the acquisition thread during cleanup, after a successful raise.
    fn restore_thread_priority(&mut self) {}

    /// The negotiated format, validated.
    fn capture_format(&self) -> Result<CaptureFormat, RecorderError> {
        CaptureFormat::new(self.sample_rate(), self.channel_count(), self.bits_per_sample())
    }
}
