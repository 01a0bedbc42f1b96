use crate::models::error::RecorderError;
use crate::models::state::RecordingState;

/// Format-unaware recorder interface.
///
/// `start` may be called repeatedly to switch between paused and capturing.
/// Once stopped, a recorder cannot be started again.
pub trait Recorder {
    /// Start or resume capture. Transitions: idle/paused → capturing.
    fn start(&mut self) -> Result<(), RecorderError>;

    /// Pause capture. The session stays alive. Transitions: capturing → paused.
    fn pause(&mut self) -> Result<(), RecorderError>;

    /// Stop for good and release audio resources.
    /// Transitions: capturing/paused → stopped.
    fn stop(&mut self) -> Result<(), RecorderError>;

    /// Whether samples are being acquired.
    fn is_started(&self) -> bool;

    /// Whether a session is alive (capturing or paused).
    fn is_recording(&self) -> bool;

    /// Peak amplitude since the previous call. Resets the peak to zero.
    fn max_amplitude(&self) -> i32;

    fn state(&self) -> RecordingState;
}
