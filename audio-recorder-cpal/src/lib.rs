//! # audio-recorder-cpal
//!
//! cpal microphone backend for audio-recorder.
//!
//! Provides:
//! - `open_default_input` / `open_input`: a `StreamingSource` fed by a cpal
//!   input stream (feature `cpal`)
//! - `convert`: device sample formats to recorder PCM
//!
//! ## Platform Requirements
//! - Linux: ALSA development headers (`libasound2-dev`) when `cpal` is enabled
//!
//! ## Usage
//! ```ignore
//! use audio_recorder_core::{ContainerFormat, Recorder, RecorderConfig, RecordingController};
//! use audio_recorder_cpal::open_default_input;
//!
//! let source = open_default_input()?;
//! let mut recorder =
//!     RecordingController::for_file(source, "take.wav", ContainerFormat::Wav, RecorderConfig::default())?;
//! recorder.start()?;
//! ```

pub mod convert;
#[cfg(feature = "cpal")]
pub mod cpal_source;

#[cfg(feature = "cpal")]
pub use cpal_source::{open_default_input, open_input};
