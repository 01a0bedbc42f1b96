use std::io;

use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;
use crate::models::format::CaptureFormat;
use crate::processing::wav_format::{
    DATA_SIZE_OFFSET, FMT_CHUNK_SIZE, MAX_PAYLOAD_SIZE, PCM_FORMAT_CODE, RIFF_SIZE_OFFSET,
    RIFF_SIZE_OVERHEAD, WAV_HEADER_SIZE,
};
use crate::traits::container_encoder::ContainerEncoder;
use crate::traits::sink::{Sink, SinkSection};

/// Streaming WAV (RIFF/PCM) encoder.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header, sizes written as 0]
/// [raw little-endian interleaved PCM...]
/// ```
///
/// Both size fields are backpatched once the payload size is known.
pub struct WavEncoder<S: Sink> {
    format: CaptureFormat,
    sink: S,
    payload_size: u64,
    digest: Sha256,
    header_written: bool,
    finished: bool,
}

impl<S: Sink> WavEncoder<S> {
    pub fn new(format: CaptureFormat, sink: S) -> Self {
        Self {
            format,
            sink,
            payload_size: 0,
            digest: Sha256::new(),
            header_written: false,
            finished: false,
        }
    }

    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }

    fn write_header(&mut self) -> io::Result<()> {
        let format = self.format;
        let sink = &mut self.sink;

        sink.set_section(SinkSection::Header);
        // Drop whatever the destination held before.
        sink.set_length(0)?;
        sink.seek(0)?;

        sink.write_bytes(b"RIFF")?;
        sink.write_u32_le(0)?;
        sink.write_bytes(b"WAVE")?;

        sink.write_bytes(b"fmt ")?;
        sink.write_u32_le(FMT_CHUNK_SIZE)?;
        sink.write_u16_le(PCM_FORMAT_CODE)?;
        sink.write_u16_le(format.channels())?;
        sink.write_u32_le(format.sample_rate())?;
        sink.write_u32_le(format.byte_rate())?;
        sink.write_u16_le(format.frame_size())?;
        sink.write_u16_le(format.bits_per_sample())?;

        sink.write_bytes(b"data")?;
        sink.write_u32_le(0)?;

        sink.set_section(SinkSection::Data);
        Ok(())
    }

    fn patch_sizes(&mut self) -> Result<(), RecorderError> {
        let payload = self.payload_size as u32;
        self.sink.set_section(SinkSection::Header);

        self.sink
            .seek(RIFF_SIZE_OFFSET)
            .and_then(|_| self.sink.write_u32_le(payload + RIFF_SIZE_OVERHEAD))
            .map_err(|e| RecorderError::container_write(RIFF_SIZE_OFFSET, 4, e))?;

        self.sink
            .seek(DATA_SIZE_OFFSET)
            .and_then(|_| self.sink.write_u32_le(payload))
            .map_err(|e| RecorderError::container_write(DATA_SIZE_OFFSET, 4, e))
    }

    fn end_offset(&self) -> u64 {
        WAV_HEADER_SIZE as u64 + self.payload_size
    }
}

impl<S: Sink> ContainerEncoder for WavEncoder<S> {
    fn on_recording_started(&mut self) -> Result<(), RecorderError> {
        self.write_header()
            .map_err(|e| RecorderError::container_write(0, WAV_HEADER_SIZE, e))?;
        self.payload_size = 0;
        self.digest = Sha256::new();
        self.header_written = true;
        Ok(())
    }

    fn on_samples(&mut self, samples: &[u8]) -> Result<(), RecorderError> {
        let offset = self.end_offset();
        if !self.header_written || self.finished {
            return Err(RecorderError::ContainerWrite {
                offset,
                len: samples.len(),
                reason: "container is not open for samples".into(),
            });
        }
        if self.payload_size + samples.len() as u64 > MAX_PAYLOAD_SIZE {
            return Err(RecorderError::ContainerWrite {
                offset,
                len: samples.len(),
                reason: "payload exceeds the 32-bit WAV size limit".into(),
            });
        }

        self.sink
            .write_bytes(samples)
            .map_err(|e| RecorderError::container_write(offset, samples.len(), e))?;
        self.payload_size += samples.len() as u64;
        self.digest.update(samples);
        Ok(())
    }

    fn on_recording_finished(&mut self) -> Result<(), RecorderError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        // Close even when patching failed so the sink is never leaked.
        let patched = if self.header_written {
            self.patch_sizes()
        } else {
            Ok(())
        };
        let closed = self
            .sink
            .close()
            .map_err(|e| RecorderError::container_write(self.end_offset(), 0, e));

        log::debug!(
            "WAV container finalized: {} payload bytes ({})",
            self.payload_size,
            self.format
        );
        patched.and(closed)
    }

    fn payload_bytes(&self) -> u64 {
        self.payload_size
    }

    fn payload_checksum(&self) -> Option<String> {
        Some(hex_encode(&self.digest.clone().finalize()))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::wav_format::WavHeader;
    use crate::storage::memory_sink::MemorySink;

    fn mono16k() -> CaptureFormat {
        CaptureFormat::new(16000, 1, 16).unwrap()
    }

    /// Sink whose writes start failing after a byte budget runs out.
    struct FailingSink {
        inner: MemorySink,
        budget: usize,
        closes: usize,
    }

    impl Sink for FailingSink {
        fn set_length(&mut self, length: u64) -> io::Result<()> {
            self.inner.set_length(length)
        }

        fn seek(&mut self, position: u64) -> io::Result<()> {
            self.inner.seek(position)
        }

        fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
            if data.len() > self.budget {
                return Err(io::Error::other("disk full"));
            }
            self.budget -= data.len();
            self.inner.write_bytes(data)
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes += 1;
            self.inner.close()
        }
    }

    #[test]
    fn round_trip_sizes() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());

        encoder.on_recording_started().unwrap();
        encoder.on_samples(&vec![0x11; 1000]).unwrap();
        encoder.on_samples(&vec![0x22; 2000]).unwrap();
        encoder.on_recording_finished().unwrap();

        let bytes = sink.contents();
        assert_eq!(bytes.len(), 44 + 3000);
        assert!(sink.is_closed());

        let header = WavHeader::parse(&bytes).unwrap();
        assert_eq!(header.riff_size, 3036);
        assert_eq!(header.data_size, 3000);
        assert_eq!(header.byte_rate, 32000);
        assert_eq!(header.block_align, 2);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 16000);
        assert_eq!(header.format_code, 1);

        assert!(bytes[44..1044].iter().all(|&b| b == 0x11));
        assert!(bytes[1044..].iter().all(|&b| b == 0x22));
    }

    #[test]
    fn provisional_header_has_zero_sizes() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());
        encoder.on_recording_started().unwrap();

        let header = WavHeader::parse(&sink.contents()).unwrap();
        assert_eq!(header.riff_size, 0);
        assert_eq!(header.data_size, 0);
    }

    #[test]
    fn truncates_existing_content() {
        let sink = MemorySink::with_contents(vec![0xFF; 5000]);
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());

        encoder.on_recording_started().unwrap();
        encoder.on_samples(&[1, 2, 3, 4]).unwrap();
        encoder.on_recording_finished().unwrap();

        assert_eq!(sink.len(), 48);
    }

    #[test]
    fn empty_recording_is_valid() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(CaptureFormat::new(8000, 2, 8).unwrap(), sink.clone());
        encoder.on_recording_started().unwrap();
        encoder.on_recording_finished().unwrap();

        let header = WavHeader::parse(&sink.contents()).unwrap();
        assert_eq!(sink.len(), 44);
        assert_eq!(header.riff_size, 36);
        assert_eq!(header.data_size, 0);
        assert_eq!(header.block_align, 2);
        assert_eq!(header.byte_rate, 16000);
    }

    #[test]
    fn announces_sections() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());
        encoder.on_recording_started().unwrap();
        encoder.on_samples(&[0; 10]).unwrap();
        encoder.on_recording_finished().unwrap();

        assert_eq!(sink.bytes_written_in(SinkSection::Header), 44 + 8);
        assert_eq!(sink.bytes_written_in(SinkSection::Data), 10);
    }

    #[test]
    fn finish_is_idempotent() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());
        encoder.on_recording_started().unwrap();
        encoder.on_recording_finished().unwrap();
        encoder.on_recording_finished().unwrap();
        assert_eq!(sink.close_count(), 1);
    }

    #[test]
    fn write_failure_reports_offset_and_length() {
        let mut encoder = WavEncoder::new(
            mono16k(),
            FailingSink {
                inner: MemorySink::new(),
                budget: 44 + 100,
                closes: 0,
            },
        );
        encoder.on_recording_started().unwrap();
        encoder.on_samples(&[0; 100]).unwrap();

        let err = encoder.on_samples(&[0; 50]).unwrap_err();
        match err {
            RecorderError::ContainerWrite { offset, len, .. } => {
                assert_eq!(offset, 144);
                assert_eq!(len, 50);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failed_patch_still_closes_sink() {
        let mut encoder = WavEncoder::new(
            mono16k(),
            FailingSink {
                inner: MemorySink::new(),
                budget: 44,
                closes: 0,
            },
        );
        encoder.on_recording_started().unwrap();

        let err = encoder.on_recording_finished().unwrap_err();
        assert!(matches!(err, RecorderError::ContainerWrite { offset: 4, len: 4, .. }));
        assert_eq!(encoder.sink.closes, 1);
    }

    #[test]
    fn finish_without_header_only_closes() {
        let sink = MemorySink::new();
        let mut encoder = WavEncoder::new(mono16k(), sink.clone());
        encoder.on_recording_finished().unwrap();
        assert!(sink.is_closed());
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn samples_before_header_rejected() {
        let mut encoder = WavEncoder::new(mono16k(), MemorySink::new());
        assert!(matches!(
            encoder.on_samples(&[0; 4]),
            Err(RecorderError::ContainerWrite { .. })
        ));
    }

    #[test]
    fn checksum_covers_payload_only() {
        let mut encoder = WavEncoder::new(mono16k(), MemorySink::new());
        encoder.on_recording_started().unwrap();
        let empty = encoder.payload_checksum().unwrap();
        assert_eq!(
            empty,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        encoder.on_samples(b"abc").unwrap();
        assert_eq!(
            encoder.payload_checksum().unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
