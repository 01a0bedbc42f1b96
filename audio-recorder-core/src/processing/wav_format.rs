//! Canonical 44-byte RIFF/WAVE PCM layout.
//!
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    RIFF chunk size = 36 + data_size
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16 (PCM format chunk size)
//! [20-21]  1 (PCM format code)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = sample_rate * channels * bits_per_sample / 8
//! [32-33]  block_align = channels * bits_per_sample / 8
//! [34-35]  bits_per_sample
//! [36-39]  "data"
//! [40-43]  data_size
//! ```

use crate::models::error::RecorderError;

pub const WAV_HEADER_SIZE: usize = 44;

/// Offset of the RIFF chunk size field.
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data chunk size field.
pub const DATA_SIZE_OFFSET: u64 = 40;

pub const FMT_CHUNK_SIZE: u32 = 16;

pub const PCM_FORMAT_CODE: u16 = 1;

/// Header bytes counted by the RIFF size field besides the payload.
pub const RIFF_SIZE_OVERHEAD: u32 = 36;

/// Largest payload whose RIFF size still fits in 32 bits.
pub const MAX_PAYLOAD_SIZE: u64 = (u32::MAX - RIFF_SIZE_OVERHEAD) as u64;

/// Parsed fields of a canonical PCM WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub format_code: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, RecorderError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(RecorderError::InvalidFormat(format!(
                "WAV header needs {} bytes, got {}",
                WAV_HEADER_SIZE,
                bytes.len()
            )));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(RecorderError::InvalidFormat("missing RIFF/WAVE magic".into()));
        }
        if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
            return Err(RecorderError::InvalidFormat("not a canonical PCM layout".into()));
        }

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Ok(Self {
            riff_size: u32_at(4),
            format_code: u16_at(20),
            channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_size: u32_at(40),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Vec<u8> {
        let mut header = Vec::with_capacity(WAV_HEADER_SIZE);
        header.extend_from_slice(b"RIFF");
        header.extend_from_slice(&(36u32 + 9600).to_le_bytes());
        header.extend_from_slice(b"WAVE");
        header.extend_from_slice(b"fmt ");
        header.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        header.extend_from_slice(&PCM_FORMAT_CODE.to_le_bytes());
        header.extend_from_slice(&2u16.to_le_bytes());
        header.extend_from_slice(&48000u32.to_le_bytes());
        header.extend_from_slice(&192000u32.to_le_bytes());
        header.extend_from_slice(&4u16.to_le_bytes());
        header.extend_from_slice(&16u16.to_le_bytes());
        header.extend_from_slice(b"data");
        header.extend_from_slice(&9600u32.to_le_bytes());
        header
    }

    #[test]
    fn parses_48khz_stereo_16bit() {
        let header = WavHeader::parse(&sample_header()).unwrap();
        assert_eq!(header.riff_size, 36 + 9600);
        assert_eq!(header.format_code, 1);
        assert_eq!(header.channels, 2);
        assert_eq!(header.sample_rate, 48000);
        assert_eq!(header.byte_rate, 192000);
        assert_eq!(header.block_align, 4);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_size, 9600);
    }

    #[test]
    fn rejects_short_input() {
        let bytes = sample_header();
        assert!(matches!(
            WavHeader::parse(&bytes[..40]),
            Err(RecorderError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample_header();
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(WavHeader::parse(&bytes).is_err());
    }
}
