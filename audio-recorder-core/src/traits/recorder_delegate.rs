use crate::models::error::RecorderError;
use crate::models::recording_result::RecordingSummary;
use crate::models::state::RecordingState;

/// Event delegate for recorder notifications.
///
/// `on_state_changed` fires on the caller's thread for start/pause. The
/// final `Stopped`, `on_error` and `on_recording_finished` fire on the thread
/// that finalized the container: the acquisition thread, or the caller's
/// thread when stopped before the first start.
pub trait RecorderDelegate: Send + Sync {
    fn on_state_changed(&self, state: RecordingState);

    /// A fatal error ended the session. Cleanup has already been attempted.
    fn on_error(&self, error: &RecorderError);

    /// The container was finalized.
    fn on_recording_finished(&self, summary: &RecordingSummary);
}
