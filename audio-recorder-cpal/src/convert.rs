//! Sample conversion from device formats to the recorder's PCM layouts.
//!
//! 16-bit output is signed little-endian; 8-bit output is unsigned with a
//! 128 midpoint, matching the WAV conventions for each depth.

/// Append `samples` as 16-bit LE PCM, clamping to [-1.0, 1.0].
pub fn f32_to_pcm16(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn i16_to_pcm16(samples: &[i16], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
}

pub fn u16_to_pcm16(samples: &[u16], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &s in samples {
        let v = (s as i32 - 32768) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn i8_to_pcm8(samples: &[i8], out: &mut Vec<u8>) {
    out.extend(samples.iter().map(|&s| (s as i16 + 128) as u8));
}

pub fn u8_to_pcm8(samples: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(samples);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_i16(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    #[test]
    fn f32_full_scale_and_clamping() {
        let mut out = Vec::new();
        f32_to_pcm16(&[0.0, 1.0, -1.0, 2.5, -3.0], &mut out);
        assert_eq!(as_i16(&out), vec![0, 32767, -32767, 32767, -32767]);
    }

    #[test]
    fn i16_passthrough_is_little_endian() {
        let mut out = Vec::new();
        i16_to_pcm16(&[0x0102, -1], &mut out);
        assert_eq!(out, vec![0x02, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn u16_recentered() {
        let mut out = Vec::new();
        u16_to_pcm16(&[0, 32768, 65535], &mut out);
        assert_eq!(as_i16(&out), vec![-32768, 0, 32767]);
    }

    #[test]
    fn i8_shifted_to_unsigned() {
        let mut out = Vec::new();
        i8_to_pcm8(&[-128, 0, 127], &mut out);
        assert_eq!(out, vec![0, 128, 255]);
    }

    #[test]
    fn appends_to_existing_bytes() {
        let mut out = vec![7];
        u8_to_pcm8(&[1, 2], &mut out);
        assert_eq!(out, vec![7, 1, 2]);
    }
}
