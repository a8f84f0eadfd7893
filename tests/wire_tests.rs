use saathi_voice::audio::pcm;
use saathi_voice::live::{pcm_mime, RealtimeAudio, ServerContent};

#[test]
fn realtime_chunk_serializes_to_the_exact_wire_shape() {
    let chunk = RealtimeAudio::new("AAECAw==".to_string(), 16000);

    let json = serde_json::to_string(&chunk).unwrap();
    assert_eq!(json, r#"{"data":"AAECAw==","mimeType":"audio/pcm;rate=16000"}"#);

    let back: RealtimeAudio = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chunk);
}

#[test]
fn mime_string_carries_the_sample_rate() {
    assert_eq!(pcm_mime(16000), "audio/pcm;rate=16000");
    assert_eq!(pcm_mime(24000), "audio/pcm;rate=24000");
}

#[test]
fn capture_payload_is_little_endian_pcm() {
    // 0x0102 must serialize low byte first before the base64 step
    let bytes = pcm::i16_to_le_bytes(&[0x0102]);
    assert_eq!(bytes, vec![0x02, 0x01]);

    let chunk = RealtimeAudio::new(pcm::encode_base64(&bytes), 16000);
    let decoded = pcm::decode_base64(&chunk.data).unwrap();
    assert_eq!(decoded, bytes);
}

#[test]
fn server_content_flags_default_to_false() {
    let content: ServerContent = serde_json::from_str(r#"{"transcript":"hi","audio":null}"#).unwrap();

    assert_eq!(content.transcript.as_deref(), Some("hi"));
    assert!(content.audio.is_none());
    assert!(!content.turn_complete);
    assert!(!content.interrupted);
}
