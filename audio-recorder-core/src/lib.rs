//! # audio-recorder-core
//!
//! Platform-agnostic pause/resume audio recorder.
//!
//! Pulls PCM from a `CaptureSource` on a dedicated acquisition thread and
//! streams it into a container (WAV) whose size fields are backpatched on
//! stop. Device backends (cpal) implement `CaptureSource`; push-style
//! callbacks plug in through `StreamingSource`.
//!
//! ## Architecture
//!
//! ```text
//! audio-recorder-core (this crate)
//! ├── traits/       ← CaptureSource, Sink, ContainerEncoder, Recorder, RecorderDelegate
//! ├── models/       ← RecorderError, CaptureFormat, RecordingState, RecorderConfig, etc.
//! ├── processing/   ← AmplitudeTracker, PcmBuffer, RingBuffer, WAV layout
//! ├── session/      ← RecordingController (state machine + acquisition loop)
//! ├── source/       ← StreamingSource (push-to-pull adapter), PriorityBoost
//! └── storage/      ← WavEncoder, FileSink, MemorySink, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod source;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::RecorderConfig;
pub use models::error::RecorderError;
pub use models::format::{CaptureFormat, ContainerFormat};
pub use models::recording_result::{RecordingMetadata, RecordingSummary};
pub use models::state::RecordingState;
pub use processing::amplitude::AmplitudeTracker;
pub use processing::pcm_buffer::PcmBuffer;
pub use processing::ring_buffer::RingBuffer;
pub use processing::wav_format::WavHeader;
pub use session::controller::RecordingController;
pub use source::priority::PriorityBoost;
pub use source::streaming::{StreamControl, StreamFeeder, StreamingSource};
pub use storage::file_sink::FileSink;
pub use storage::memory_sink::MemorySink;
pub use storage::metadata::{metadata_path, read_metadata, write_metadata};
pub use storage::wav_encoder::WavEncoder;
pub use traits::capture_source::CaptureSource;
pub use traits::container_encoder::ContainerEncoder;
pub use traits::recorder::Recorder;
pub use traits::recorder_delegate::RecorderDelegate;
pub use traits::sink::{Sink, SinkSection};
