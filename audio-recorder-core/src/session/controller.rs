use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::format::{CaptureFormat, ContainerFormat};
use crate::models::recording_result::RecordingSummary;
use crate::models::state::RecordingState;
use crate::processing::pcm_buffer::PcmBuffer;
use crate::session::acquisition::{report_outcome, Session, SessionFlags};
use crate::storage::file_sink::FileSink;
use crate::traits::capture_source::CaptureSource;
use crate::traits::container_encoder::ContainerEncoder;
use crate::traits::recorder::Recorder;
use crate::traits::recorder_delegate::RecorderDelegate;

type SessionOutcome = Result<RecordingSummary, RecorderError>;

/// Pause/resume recorder driving one capture source into one container.
///
/// Generic over the device via `CaptureSource` and over the container via
/// `ContainerEncoder`. Data flow on the acquisition thread:
/// ```text
/// [CaptureSource] → read → [PcmBuffer] ─┬→ [AmplitudeTracker]
///                                       └→ [ContainerEncoder] → [Sink]
/// ```
///
/// The first `start` spawns the acquisition thread; later `start`/`pause`
/// calls only flip the started flag. `stop` is fire-and-forget; use
/// [`wait`](Self::wait) or [`stop_and_wait`](Self::stop_and_wait) to block
/// until the container is finalized.
pub struct RecordingController<C: CaptureSource + 'static, E: ContainerEncoder + 'static> {
    format: CaptureFormat,
    config: RecorderConfig,
    flags: Arc<SessionFlags>,
    delegate: Option<Arc<dyn RecorderDelegate>>,

    // Owned here until the first start moves it to the acquisition thread
    pending: Option<Session<C, E>>,
    worker: Option<thread::JoinHandle<SessionOutcome>>,
    outcome: Option<SessionOutcome>,
}

impl<C: CaptureSource + 'static, E: ContainerEncoder + 'static> RecordingController<C, E> {
    /// Take ownership of an opened source and an encoder.
    ///
    /// Fails with `InvalidFormat` when the source's format is unsupported;
    /// the source is released in that case.
    pub fn new(mut source: C, encoder: E, config: RecorderConfig) -> Result<Self, RecorderError> {
        let (format, buffer) = match prepare(&source, &config) {
            Ok(prepared) => prepared,
            Err(e) => {
                source.release();
                return Err(e);
            }
        };
        Ok(Self::assemble(source, encoder, config, format, buffer))
    }

    fn assemble(source: C, encoder: E, config: RecorderConfig, format: CaptureFormat, buffer: PcmBuffer) -> Self {
        Self {
            format,
            config,
            flags: Arc::new(SessionFlags::new()),
            delegate: None,
            pending: Some(Session::new(source, encoder, buffer, format)),
            worker: None,
            outcome: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Block until the session ends and return its outcome.
    ///
    /// Without a prior `stop` this only returns once the session fails.
    pub fn wait(&mut self) -> SessionOutcome {
        if let Some(handle) = self.worker.take() {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(RecorderError::Unknown("acquisition thread panicked".into())));
            self.flags.mark_stopped();
            self.outcome = Some(outcome);
        }

        self.outcome.clone().unwrap_or_else(|| {
            Err(RecorderError::Configuration(
                "recorder was neither started nor stopped".into(),
            ))
        })
    }

    /// Stop, then wait for the container to be finalized.
    ///
    /// Also returns the outcome of a session that already ended on its own.
    pub fn stop_and_wait(&mut self) -> SessionOutcome {
        match self.stop() {
            Ok(()) | Err(RecorderError::AlreadyStopped) => self.wait(),
            Err(e) => Err(e),
        }
    }

    fn ensure_not_stopped(&self) -> Result<(), RecorderError> {
        if self.flags.stopped.load(Ordering::SeqCst) || self.flags.stop.is_raised() {
            return Err(RecorderError::AlreadyStopped);
        }
        Ok(())
    }

    fn spawn(&mut self, session: Session<C, E>) -> Result<(), RecorderError> {
        self.flags.recording.store(true, Ordering::SeqCst);

        let flags = Arc::clone(&self.flags);
        let config = self.config.clone();
        let delegate = self.delegate.clone();

        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || session.run(&flags, &config, delegate.as_deref()));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                // The session was dropped with the closure, which released it.
                self.flags.mark_stopped();
                Err(RecorderError::Unknown(format!(
                    "failed to spawn acquisition thread: {}",
                    e
                )))
            }
        }
    }

    fn notify(&self, state: RecordingState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }
}

impl<C: CaptureSource + 'static> RecordingController<C, Box<dyn ContainerEncoder>> {
    /// Record `source` into a file at `path` using `container`.
    ///
    /// The file is only touched once the format and config are accepted.
    pub fn for_file(
        mut source: C,
        path: impl AsRef<Path>,
        container: ContainerFormat,
        config: RecorderConfig,
    ) -> Result<Self, RecorderError> {
        let path = path.as_ref();
        let opened = prepare(&source, &config).and_then(|prepared| {
            FileSink::open(path)
                .map(|sink| (prepared, sink))
                .map_err(|e| RecorderError::Storage(format!("failed to open {}: {}", path.display(), e)))
        });

        let ((format, buffer), sink) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                source.release();
                return Err(e);
            }
        };
        let encoder = container.encoder(format, Box::new(sink));
        Ok(Self::assemble(source, encoder, config, format, buffer))
    }
}

impl<C: CaptureSource + 'static, E: ContainerEncoder + 'static> Recorder for RecordingController<C, E> {
    fn start(&mut self) -> Result<(), RecorderError> {
        self.ensure_not_stopped()?;
        let before = self.state();
        self.flags.started.store(true, Ordering::SeqCst);
        self.flags.amplitude.reset();

        if !self.flags.recording.load(Ordering::SeqCst) {
            if let Some(session) = self.pending.take() {
                self.spawn(session)?;
            }
        }

        if before != RecordingState::Capturing {
            self.notify(RecordingState::Capturing);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), RecorderError> {
        self.ensure_not_stopped()?;
        let before = self.state();
        self.flags.started.store(false, Ordering::SeqCst);
        self.flags.pauses.fetch_add(1, Ordering::SeqCst);
        self.flags.amplitude.reset();

        let after = self.state();
        if after != before {
            self.notify(after);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        self.ensure_not_stopped()?;
        self.flags.stop.raise();

        // Never started: nothing runs on another thread, finalize here.
        if let Some(session) = self.pending.take() {
            let outcome = session.finish_without_capture();
            self.flags.mark_stopped();
            report_outcome(&outcome, self.delegate.as_deref());
            self.outcome = Some(outcome);
        }

        log::info!("recording stop requested");
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.flags.started.load(Ordering::SeqCst)
    }

    fn is_recording(&self) -> bool {
        self.flags.recording.load(Ordering::SeqCst)
    }

    fn max_amplitude(&self) -> i32 {
        self.flags.amplitude.take()
    }

    fn state(&self) -> RecordingState {
        self.flags.state()
    }
}

impl<C: CaptureSource + 'static, E: ContainerEncoder + 'static> Drop for RecordingController<C, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.flags.stop.raise();
            if handle.join().is_err() {
                log::error!("acquisition thread panicked");
            }
        }
    }
}

/// Validate `config` and size the PCM buffer for the source's format.
fn prepare<C: CaptureSource>(
    source: &C,
    config: &RecorderConfig,
) -> Result<(CaptureFormat, PcmBuffer), RecorderError> {
    config.validate().map_err(RecorderError::Configuration)?;
    let format = source.capture_format()?;
    let minimum = source.minimum_buffer_size(&format);
    let buffer = PcmBuffer::for_format(&format, config.buffer_duration_secs, minimum)?;
    Ok((format, buffer))
}
