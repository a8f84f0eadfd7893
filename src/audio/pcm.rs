//! Sample-format conversion and transport encoding for raw PCM audio.
//!
//! The wire format is 16-bit little-endian PCM, base64-encoded, with an
//! explicit mime type string (`audio/pcm;rate=<hz>`).

use anyhow::{Context, Result};
use base64::Engine;

/// Convert float samples in [-1.0, 1.0] to 16-bit signed integers
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Convert 16-bit signed integers back to float samples in [-1.0, 1.0]
pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / i16::MAX as f32).collect()
}

/// Pack samples as little-endian bytes
pub fn i16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Unpack little-endian bytes into samples (a trailing odd byte is dropped)
pub fn le_bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Base64-encode a PCM byte buffer for transport
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode a base64 transport payload back into PCM bytes
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .context("Failed to decode base64 audio payload")
}

/// Decode a base64 payload of 16-bit LE PCM into float samples
pub fn decode_audio_payload(data: &str) -> Result<Vec<f32>> {
    let bytes = decode_base64(data)?;
    Ok(i16_to_f32(&le_bytes_to_i16(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_conversion_clamps_out_of_range() {
        let out = f32_to_i16(&[0.0, 1.0, -1.0, 2.0, -2.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
        assert_eq!(out[3], i16::MAX);
        assert_eq!(out[4], -i16::MAX);
    }

    #[test]
    fn le_packing_round_trips() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN];
        let bytes = i16_to_le_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);
        assert_eq!(le_bytes_to_i16(&bytes), samples);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        assert_eq!(le_bytes_to_i16(&[0x01, 0x00, 0xff]), vec![1]);
    }

    #[test]
    fn base64_payload_round_trips_to_floats() {
        let samples = vec![0i16, 16384, -16384];
        let encoded = encode_base64(&i16_to_le_bytes(&samples));
        let decoded = decode_audio_payload(&encoded).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!((decoded[1] - 0.5).abs() < 0.001);
        assert!((decoded[2] + 0.5).abs() < 0.001);
    }
}
