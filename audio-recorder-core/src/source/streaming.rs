use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::error::RecorderError;
use crate::models::format::CaptureFormat;
use crate::processing::ring_buffer::RingBuffer;
use crate::source::priority::PriorityBoost;
use crate::traits::capture_source::CaptureSource;

/// How long a read waits for pushed samples before reporting an empty read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Device-side handle a `StreamingSource` drives on start, stop and release.
pub trait StreamControl: Send {
    fn play(&mut self) -> Result<(), RecorderError>;

    fn pause(&mut self) -> Result<(), RecorderError>;

    /// Tear the device stream down. Called at most once.
    fn close(&mut self);
}

struct StreamState {
    ring: RingBuffer,
    failure: Option<i32>,
}

struct StreamShared {
    state: Mutex<StreamState>,
    ready: Condvar,
    accepting: AtomicBool,
}

/// Pull-style `CaptureSource` fed by push-style audio callbacks.
///
/// ```text
/// [device callback] → StreamFeeder::push → [RingBuffer] → read → [recorder]
/// ```
///
/// Samples pushed while the source is not capturing are discarded. When the
/// ring is full the oldest bytes are dropped.
pub struct StreamingSource {
    format: CaptureFormat,
    shared: Arc<StreamShared>,
    control: Option<Box<dyn StreamControl>>,
    read_timeout: Duration,
    minimum_buffer_size: usize,
    capturing: bool,
    priority: PriorityBoost,
}

/// Producer half of a `StreamingSource`. Cheap to clone; safe to call from
/// a real-time callback thread.
#[derive(Clone)]
pub struct StreamFeeder {
    shared: Arc<StreamShared>,
}

impl StreamingSource {
    /// Create a source for `format` holding up to `ring_capacity` bytes.
    pub fn new(format: CaptureFormat, ring_capacity: usize) -> (Self, StreamFeeder) {
        let shared = Arc::new(StreamShared {
            state: Mutex::new(StreamState {
                ring: RingBuffer::new(ring_capacity),
                failure: None,
            }),
            ready: Condvar::new(),
            accepting: AtomicBool::new(false),
        });

        let source = Self {
            format,
            shared: Arc::clone(&shared),
            control: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            minimum_buffer_size: format.frame_size() as usize,
            capturing: false,
            priority: PriorityBoost::new(),
        };
        (source, StreamFeeder { shared })
    }

    pub fn with_control(mut self, control: Box<dyn StreamControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Smallest read buffer the device needs, in bytes. Defaults to one frame.
    pub fn with_minimum_buffer_size(mut self, bytes: usize) -> Self {
        self.minimum_buffer_size = bytes.max(1);
        self
    }

    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }

    /// Bytes dropped on overflow since creation.
    pub fn dropped_bytes(&self) -> u64 {
        self.shared.state.lock().ring.dropped()
    }
}

impl CaptureSource for StreamingSource {
    fn sample_rate(&self) -> u32 {
        self.format.sample_rate()
    }

    fn channel_count(&self) -> u16 {
        self.format.channels()
    }

    fn bits_per_sample(&self) -> u16 {
        self.format.bits_per_sample()
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn start_capturing(&mut self) -> Result<(), RecorderError> {
        if let Some(control) = self.control.as_mut() {
            control.play()?;
        }
        self.shared.accepting.store(true, Ordering::SeqCst);
        self.capturing = true;
        Ok(())
    }

    fn stop_capturing(&mut self) -> Result<(), RecorderError> {
        self.shared.accepting.store(false, Ordering::SeqCst);
        self.capturing = false;
        self.shared.ready.notify_all();
        match self.control.as_mut() {
            Some(control) => control.pause(),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        self.shared.accepting.store(false, Ordering::SeqCst);
        self.capturing = false;
        if let Some(mut control) = self.control.take() {
            control.close();
        }
        self.shared.state.lock().ring.reset();
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RecorderError> {
        let mut state = self.shared.state.lock();
        if state.failure.is_none() && state.ring.is_empty() {
            self.shared.ready.wait_for(&mut state, self.read_timeout);
        }

        if let Some(code) = state.failure.take() {
            return Err(RecorderError::CaptureRead { code });
        }
        Ok(state.ring.read_into(buffer))
    }

    fn minimum_buffer_size(&self, format: &CaptureFormat) -> Option<usize> {
        (*format == self.format).then_some(self.minimum_buffer_size)
    }

    fn discard_pending(&mut self) {
        let mut state = self.shared.state.lock();
        let stale = state.ring.count();
        state.ring.reset();
        if stale > 0 {
            log::debug!("discarded {} bytes buffered while paused", stale);
        }
    }

    fn raise_thread_priority(&mut self) {
        self.priority.raise();
    }

    fn restore_thread_priority(&mut self) {
        self.priority.restore();
    }
}

impl StreamFeeder {
    /// Append interleaved PCM bytes in the source's format.
    pub fn push(&self, data: &[u8]) {
        if !self.is_accepting() || data.is_empty() {
            return;
        }

        let dropped = self.shared.state.lock().ring.write(data);
        if dropped > 0 {
            log::warn!("streaming source overflow, dropped {} bytes", dropped);
        }
        self.shared.ready.notify_one();
    }

    /// Report a device failure; the next read returns `CaptureRead { code }`.
    pub fn fail(&self, code: i32) {
        self.shared.state.lock().failure = Some(code);
        self.shared.ready.notify_all();
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Instant;

    fn mono16k() -> CaptureFormat {
        CaptureFormat::new(16000, 1, 16).unwrap()
    }

    #[derive(Default)]
    struct ControlCalls {
        plays: AtomicUsize,
        pauses: AtomicUsize,
        closes: AtomicUsize,
    }

    struct CountingControl(Arc<ControlCalls>);

    impl StreamControl for CountingControl {
        fn play(&mut self) -> Result<(), RecorderError> {
            self.0.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), RecorderError> {
            self.0.pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn close(&mut self) {
            self.0.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn push_ignored_until_capturing() {
        let (source, feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_millis(5));
        let mut buf = [0u8; 16];

        feeder.push(&[1, 2, 3, 4]);
        source.start_capturing().unwrap();
        assert_eq!(source.read(&mut buf).unwrap(), 0);

        feeder.push(&[5, 6, 7, 8]);
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[5, 6, 7, 8]);
    }

    #[test]
    fn read_times_out_with_zero_bytes() {
        let (source, _feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_millis(20));
        source.start_capturing().unwrap();

        let started = Instant::now();
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn read_wakes_on_push_from_another_thread() {
        let (source, feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_secs(5));
        source.start_capturing().unwrap();

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            feeder.push(&[9, 9]);
        });

        let started = Instant::now();
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert!(started.elapsed() < Duration::from_secs(2));
        producer.join().unwrap();
    }

    #[test]
    fn failure_surfaces_once() {
        let (source, feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_millis(5));
        source.start_capturing().unwrap();

        feeder.push(&[1, 2]);
        feeder.fail(-6);
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf), Err(RecorderError::CaptureRead { code: -6 }));
        assert_eq!(source.read(&mut buf).unwrap(), 2);
    }

    #[test]
    fn overflow_keeps_newest_bytes() {
        let (mut source, feeder) = StreamingSource::new(mono16k(), 4);
        source.start_capturing().unwrap();

        feeder.push(&[1, 2, 3]);
        feeder.push(&[4, 5, 6]);
        assert_eq!(source.dropped_bytes(), 2);

        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[3, 4, 5, 6]);
    }

    #[test]
    fn stop_capturing_discards_later_pushes() {
        let (source, feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_millis(5));
        source.start_capturing().unwrap();
        source.stop_capturing().unwrap();
        assert!(!source.is_capturing());
        assert!(!feeder.is_accepting());

        feeder.push(&[1, 2]);
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn control_follows_lifecycle() {
        let calls = Arc::new(ControlCalls::default());
        let (source, _feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_control(Box::new(CountingControl(Arc::clone(&calls))));

        source.start_capturing().unwrap();
        source.stop_capturing().unwrap();
        source.release();
        source.release();

        assert_eq!(calls.plays.load(Ordering::SeqCst), 1);
        assert_eq!(calls.pauses.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn discard_pending_empties_the_ring() {
        let (source, feeder) = StreamingSource::new(mono16k(), 64);
        let mut source = source.with_read_timeout(Duration::from_millis(5));
        source.start_capturing().unwrap();

        feeder.push(&[7; 10]);
        source.discard_pending();
        let mut buf = [0u8; 16];
        assert_eq!(source.read(&mut buf).unwrap(), 0);

        feeder.push(&[8; 2]);
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(source.dropped_bytes(), 0);
    }

    #[test]
    fn minimum_buffer_only_for_own_format() {
        let (source, _feeder) = StreamingSource::new(mono16k(), 64);
        let source = source.with_minimum_buffer_size(1280);
        assert_eq!(source.minimum_buffer_size(&mono16k()), Some(1280));

        let stereo = CaptureFormat::new(16000, 2, 16).unwrap();
        assert_eq!(source.minimum_buffer_size(&stereo), None);
    }
}
