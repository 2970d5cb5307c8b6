/// Wire-format tests for the gateway and feedback protocols
///
/// Frames are encoded and decoded against in-memory buffers; no sockets
/// are involved.
use std::io::Cursor;

use apns_legacy::frame::{decode_feedback_stream, encode_push_frame, normalize_token};
use apns_legacy::{ApnsError, FeedbackRecord, Notification};
use serde_json::{json, Value};

fn sample_token() -> String {
    "aabbccdd".repeat(5)
}

#[test]
fn push_frame_layout() {
    let notification = Notification::new(sample_token(), "Hello").with_badge(5);
    let frame = encode_push_frame(&notification).unwrap();

    // [u8 cmd][u16 BE token-len][20 token bytes][u8 payload-len][payload]
    assert_eq!(frame[0], 0x00);
    assert_eq!(frame[1..3], [0x00, 0x20]);
    assert_eq!(frame[3..23], hex::decode(sample_token()).unwrap()[..]);

    let payload_len = frame[23] as usize;
    assert_eq!(frame.len(), 24 + payload_len);

    let payload: Value = serde_json::from_slice(&frame[24..]).unwrap();
    assert_eq!(
        payload,
        json!({"aps": {"alert": "Hello", "sound": "default", "badge": 5}})
    );
}

#[test]
fn push_frame_round_trips() {
    let notification = Notification::new(sample_token(), "Ping")
        .with_sound("chime")
        .with_extra("conversation", 7);
    let frame = encode_push_frame(&notification).unwrap();

    assert_eq!(frame[0], 0x00);
    let token = &frame[3..23];
    assert_eq!(token, &normalize_token(&sample_token()).unwrap()[..]);

    let payload: Value = serde_json::from_slice(&frame[24..]).unwrap();
    assert_eq!(payload["aps"]["sound"], "chime");
    assert_eq!(payload["conversation"], 7);
    assert_eq!(frame[23] as usize, frame.len() - 24);
}

#[test]
fn oversized_payload_rejected_before_any_write() {
    let notification = Notification::new(sample_token(), "x".repeat(300));
    let err = encode_push_frame(&notification).unwrap_err();

    match err {
        ApnsError::PayloadTooLarge(size) => assert!(size > 255),
        other => panic!("expected PayloadTooLarge, got {other:?}"),
    }
}

#[test]
fn payload_at_limit_accepted() {
    // 255 bytes exactly: {"aps":{"alert":"...","sound":"default"}} is 38
    // bytes of scaffolding around the alert text.
    let notification = Notification::new(sample_token(), "x".repeat(217));
    let frame = encode_push_frame(&notification).unwrap();

    assert_eq!(frame[23], 255);
}

#[test]
fn separated_token_encodes_identically() {
    let spaced = "aabbccdd ".repeat(5);
    let plain = encode_push_frame(&Notification::new(sample_token(), "Hi")).unwrap();
    let stripped = encode_push_frame(&Notification::new(spaced, "Hi")).unwrap();

    assert_eq!(plain, stripped);
}

fn feedback_record_bytes(timestamp: u32, token: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&timestamp.to_be_bytes());
    bytes.extend_from_slice(&(token.len() as u16).to_be_bytes());
    bytes.extend_from_slice(token);
    bytes
}

#[test]
fn feedback_single_record() {
    // 00 00 00 64 00 14 <20 bytes> -> timestamp 100, 20-byte token
    let token = [0xabu8; 20];
    let stream = feedback_record_bytes(100, &token);

    let records = decode_feedback_stream(Cursor::new(stream)).unwrap();
    assert_eq!(
        records,
        vec![FeedbackRecord {
            timestamp: 100,
            device_token: "ab".repeat(20),
        }]
    );
}

#[test]
fn feedback_records_keep_arrival_order() {
    let mut stream = Vec::new();
    for i in 0..5u32 {
        stream.extend(feedback_record_bytes(1_600_000_000 + i, &[i as u8; 20]));
    }

    let records = decode_feedback_stream(Cursor::new(stream)).unwrap();
    assert_eq!(records.len(), 5);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.timestamp, 1_600_000_000 + i as u32);
        assert_eq!(record.device_token, hex::encode([i as u8; 20]));
    }
}

#[test]
fn feedback_trailing_partial_record_dropped() {
    let mut stream = feedback_record_bytes(42, &[0x11; 20]);
    // Truncated second record: header plus half a token.
    stream.extend_from_slice(&feedback_record_bytes(43, &[0x22; 20])[..16]);

    let records = decode_feedback_stream(Cursor::new(stream)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp, 42);
}

#[test]
fn feedback_truncated_header_dropped() {
    let mut stream = feedback_record_bytes(42, &[0x11; 20]);
    stream.extend([0x00, 0x00, 0x01]);

    let records = decode_feedback_stream(Cursor::new(stream)).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn feedback_empty_stream_is_empty_result() {
    let records = decode_feedback_stream(Cursor::new(Vec::new())).unwrap();
    assert!(records.is_empty());
}

#[test]
fn feedback_token_length_is_opaque() {
    // Historical streams carried 32-byte tokens in 38-byte records.
    let token = [0x5a; 32];
    let stream = feedback_record_bytes(7, &token);
    assert_eq!(stream.len(), 38);

    let records = decode_feedback_stream(Cursor::new(stream)).unwrap();
    assert_eq!(records[0].device_token, hex::encode(token));
}
