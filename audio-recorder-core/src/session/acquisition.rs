use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::format::CaptureFormat;
use crate::models::recording_result::RecordingSummary;
use crate::models::state::RecordingState;
use crate::processing::amplitude::AmplitudeTracker;
use crate::processing::pcm_buffer::PcmBuffer;
use crate::session::stop_signal::StopSignal;
use crate::traits::capture_source::CaptureSource;
use crate::traits::container_encoder::ContainerEncoder;
use crate::traits::recorder_delegate::RecorderDelegate;

/// State shared between the caller and the acquisition thread.
///
/// - `started`: samples are being acquired. Set by start, cleared by pause.
/// - `recording`: the acquisition thread is alive. Set once on spawn.
/// - `stopped`: terminal. Set once cleanup finished; never cleared.
/// - `pauses`: bumped on every pause so the loop can tell a resume happened.
///
/// `stopped` is set before the other flags are cleared, so observers never
/// see a finished session as idle.
#[derive(Debug, Default)]
pub(crate) struct SessionFlags {
    pub started: AtomicBool,
    pub recording: AtomicBool,
    pub stopped: AtomicBool,
    pub pauses: AtomicU64,
    pub amplitude: AmplitudeTracker,
    pub stop: StopSignal,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        RecordingState::from_flags(
            self.started.load(Ordering::SeqCst),
            self.recording.load(Ordering::SeqCst),
            self.stopped.load(Ordering::SeqCst),
        )
    }

    pub fn mark_stopped(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        self.amplitude.reset();
    }
}

/// Everything one recording session owns: the device, the container and
/// the reusable PCM buffer.
pub(crate) struct Session<C: CaptureSource, E: ContainerEncoder> {
    source: C,
    encoder: E,
    buffer: PcmBuffer,
    format: CaptureFormat,
    priority_raised: bool,
    torn_down: bool,
}

impl<C: CaptureSource, E: ContainerEncoder> Session<C, E> {
    pub fn new(source: C, encoder: E, buffer: PcmBuffer, format: CaptureFormat) -> Self {
        Self {
            source,
            encoder,
            buffer,
            format,
            priority_raised: false,
            torn_down: false,
        }
    }

    /// Body of the acquisition thread.
    ///
    /// Cleanup runs on every exit path: stop, fatal read error or fatal
    /// write error.
    pub fn run(
        mut self,
        flags: &SessionFlags,
        config: &RecorderConfig,
        delegate: Option<&dyn RecorderDelegate>,
    ) -> Result<RecordingSummary, RecorderError> {
        log::info!(
            "recording session started ({}, {} byte buffer)",
            self.format,
            self.buffer.capacity()
        );

        let captured = self.capture(flags, config);
        let finished = self.teardown();
        flags.mark_stopped();

        let outcome = captured.and(finished).map(|()| self.summary());
        report_outcome(&outcome, delegate);
        outcome
    }

    /// Finalize a session whose acquisition thread never ran, leaving an
    /// empty but well-formed container behind.
    pub fn finish_without_capture(mut self) -> Result<RecordingSummary, RecorderError> {
        let started = self.encoder.on_recording_started();
        let finished = self.teardown();
        started.and(finished).map(|()| self.summary())
    }

    fn capture(&mut self, flags: &SessionFlags, config: &RecorderConfig) -> Result<(), RecorderError> {
        if config.elevate_priority {
            self.source.raise_thread_priority();
            self.priority_raised = true;
        }
        if !self.source.is_capturing() {
            self.source.start_capturing()?;
        }
        self.encoder.on_recording_started()?;

        let bits = self.format.bits_per_sample();
        let mut seen_pauses = 0;
        while !flags.stop.is_raised() {
            if !flags.started.load(Ordering::SeqCst) {
                if flags.stop.wait_timeout(config.paused_poll_interval) {
                    break;
                }
                continue;
            }

            // Whatever the device buffered during a pause is not part of the recording.
            let pauses = flags.pauses.load(Ordering::SeqCst);
            if pauses != seen_pauses {
                seen_pauses = pauses;
                self.source.discard_pending();
            }

            let read = self.source.read(self.buffer.as_mut_slice())?;
            if read == 0 {
                continue;
            }
            if read > self.buffer.capacity() {
                log::warn!(
                    "capture source reported {} bytes for a {} byte buffer, keeping {}",
                    read,
                    self.buffer.capacity(),
                    self.buffer.capacity()
                );
            }

            let pcm = self.buffer.filled(read);
            flags.amplitude.update(pcm, bits);
            self.encoder.on_samples(pcm)?;
        }
        Ok(())
    }

    /// Finalize the container, then stop and release the device. Runs once.
    fn teardown(&mut self) -> Result<(), RecorderError> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        let finished = self.encoder.on_recording_finished();
        if let Err(ref e) = finished {
            log::warn!("failed to finalize container: {}", e);
        }

        if self.source.is_capturing() {
            if let Err(e) = self.source.stop_capturing() {
                log::warn!("failed to stop capture device: {}", e);
            }
        }
        self.source.release();

        if self.priority_raised {
            self.source.restore_thread_priority();
            self.priority_raised = false;
        }
        finished
    }

    fn summary(&self) -> RecordingSummary {
        RecordingSummary::new(
            self.format,
            self.encoder.payload_bytes(),
            self.encoder.payload_checksum(),
        )
    }
}

impl<C: CaptureSource, E: ContainerEncoder> Drop for Session<C, E> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            log::warn!("session cleanup on drop failed: {}", e);
        }
    }
}

/// Log the session outcome and forward it to the delegate.
pub(crate) fn report_outcome(
    outcome: &Result<RecordingSummary, RecorderError>,
    delegate: Option<&dyn RecorderDelegate>,
) {
    match outcome {
        Ok(summary) => {
            log::info!(
                "recording finished: {} bytes, {:.2}s",
                summary.payload_bytes,
                summary.duration_secs
            );
            if let Some(d) = delegate {
                d.on_recording_finished(summary);
            }
        }
        Err(e) => {
            log::error!("recording session failed: {}", e);
            if let Some(d) = delegate {
                d.on_error(e);
            }
        }
    }
    if let Some(d) = delegate {
        d.on_state_changed(RecordingState::Stopped);
    }
}
