use crate::models::error::RecorderError;
use crate::models::format::CaptureFormat;

/// Fixed-capacity byte buffer reused for every device read.
///
/// Only `[0, n)` of the most recent read is meaningful.
#[derive(Debug)]
pub struct PcmBuffer {
    data: Vec<u8>,
}

impl PcmBuffer {
    /// Size a buffer to hold `duration_secs` of audio in `format`.
    ///
    /// `minimum` is the device-reported minimum buffer size; `None` means the
    /// device rejected the format. The capacity never drops below the minimum.
    pub fn for_format(
        format: &CaptureFormat,
        duration_secs: u32,
        minimum: Option<usize>,
    ) -> Result<Self, RecorderError> {
        let minimum = minimum.ok_or_else(|| {
            RecorderError::InvalidFormat(format!("device cannot compute a buffer size for {}", format))
        })?;

        let capacity = Self::capacity_for(format, duration_secs);
        if capacity == 0 {
            return Err(RecorderError::Configuration("PCM buffer capacity is zero".into()));
        }

        let capacity = if capacity < minimum {
            log::debug!(
                "PCM buffer of {} bytes below device minimum {}, growing",
                capacity,
                minimum
            );
            minimum
        } else {
            capacity
        };

        log::debug!("PCM buffer sized to {} bytes for {}", capacity, format);
        Ok(Self {
            data: vec![0; capacity],
        })
    }

    /// sample rate × bytes per sample × channels × seconds.
    pub fn capacity_for(format: &CaptureFormat, duration_secs: u32) -> usize {
        format.sample_rate() as usize
            * format.bytes_per_sample() as usize
            * format.channels() as usize
            * duration_secs as usize
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The first `len` bytes, clamped to capacity.
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.data[..len.min(self.data.len())]
    }
}
