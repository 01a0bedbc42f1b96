use std::sync::atomic::{AtomicI32, Ordering};

/// Peak sample value observed since the last read.
///
/// Updated by the acquisition thread, read and reset from any thread.
///
/// 16-bit PCM tracks the largest *signed* sample, so a negative excursion
/// never raises the peak. 8-bit PCM is unsigned and tracks the largest byte.
#[derive(Debug, Default)]
pub struct AmplitudeTracker {
    peak: AtomicI32,
}

impl AmplitudeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `pcm` into the running peak.
    ///
    /// A trailing odd byte of 16-bit PCM is ignored.
    pub fn update(&self, pcm: &[u8], bits_per_sample: u16) {
        let peak = match bits_per_sample {
            16 => pcm
                .chunks_exact(2)
                .map(|s| i16::from_le_bytes([s[0], s[1]]) as i32)
                .max(),
            _ => pcm.iter().map(|&b| b as i32).max(),
        };
        if let Some(peak) = peak {
            self.peak.fetch_max(peak, Ordering::AcqRel);
        }
    }

    /// Return the peak and reset it to zero.
    pub fn take(&self) -> i32 {
        self.peak.swap(0, Ordering::AcqRel)
    }

    pub fn reset(&self) {
        self.peak.store(0, Ordering::Release);
    }

    pub fn peek(&self) -> i32 {
        self.peak.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn tracks_max_signed_16bit_sample() {
        let tracker = AmplitudeTracker::new();
        tracker.update(&pcm16(&[100, -50, 300, 20]), 16);
        assert_eq!(tracker.take(), 300);
    }

    #[test]
    fn negative_peaks_do_not_count() {
        let tracker = AmplitudeTracker::new();
        tracker.update(&pcm16(&[-32768, -1, -200]), 16);
        assert_eq!(tracker.take(), 0);
    }

    #[test]
    fn tracks_max_unsigned_8bit_sample() {
        let tracker = AmplitudeTracker::new();
        tracker.update(&[10, 250, 5], 8);
        assert_eq!(tracker.take(), 250);
    }

    #[test]
    fn take_resets() {
        let tracker = AmplitudeTracker::new();
        tracker.update(&pcm16(&[1200]), 16);
        assert_eq!(tracker.take(), 1200);
        assert_eq!(tracker.take(), 0);
    }

    #[test]
    fn peak_only_grows_between_reads() {
        let tracker = AmplitudeTracker::new();
        tracker.update(&pcm16(&[900]), 16);
        tracker.update(&pcm16(&[10, 20]), 16);
        assert_eq!(tracker.peek(), 900);

        tracker.reset();
        assert_eq!(tracker.peek(), 0);
    }

    #[test]
    fn odd_trailing_byte_ignored() {
        let tracker = AmplitudeTracker::new();
        let mut pcm = pcm16(&[42]);
        pcm.push(0x7F);
        tracker.update(&pcm, 16);
        assert_eq!(tracker.take(), 42);
    }
}
