use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use crate::storage::wav_encoder::WavEncoder;
use crate::traits::container_encoder::ContainerEncoder;
use crate::traits::sink::Sink;

/// Negotiated PCM format of a capture source. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureFormat {
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

impl CaptureFormat {
    /// Build a format, rejecting triples no container can describe.
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self, RecorderError> {
        if sample_rate == 0 {
            return Err(RecorderError::InvalidFormat("sample rate must be positive".into()));
        }
        if channels == 0 {
            return Err(RecorderError::InvalidFormat("channel count must be positive".into()));
        }
        if ![8, 16].contains(&bits_per_sample) {
            return Err(RecorderError::InvalidFormat(format!(
                "unsupported bits per sample: {}",
                bits_per_sample
            )));
        }
        let frame_size = channels.checked_mul(bits_per_sample / 8);
        let byte_rate = frame_size.and_then(|frame| sample_rate.checked_mul(frame as u32));
        if byte_rate.is_none() {
            return Err(RecorderError::InvalidFormat(format!(
                "{} Hz, {} ch, {} bit overflows the 32-bit byte rate",
                sample_rate, channels, bits_per_sample
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            bits_per_sample,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame (one sample for every channel).
    pub fn frame_size(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.frame_size() as u32
    }

    /// Playback duration of `bytes` of PCM in this format.
    pub fn duration_secs(&self, bytes: u64) -> f64 {
        bytes as f64 / self.byte_rate() as f64
    }
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {} bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// Container formats a recording can be encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Wav,
}

impl ContainerFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
        }
    }

    /// Create the encoder for this container, writing into `sink`.
    pub fn encoder(&self, format: CaptureFormat, sink: Box<dyn Sink>) -> Box<dyn ContainerEncoder> {
        match self {
            Self::Wav => Box::new(WavEncoder::new(format, sink)),
        }
    }
}
