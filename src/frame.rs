//! Wire framing for the binary gateway and feedback protocols.
//!
//! Encoding and decoding are pure functions over byte buffers and readers;
//! no socket I/O happens here. A notification that fails validation
//! therefore never reaches the wire.

use std::io::{ErrorKind, Read};

use serde::Serialize;

use crate::error::ApnsError;
use crate::notification::Notification;

/// Command byte of a simple-format notification frame.
pub const COMMAND_SEND: u8 = 0;

/// Fixed value of the token-length field. The protocol documents it as the
/// length of the token in bits; it is written verbatim, not derived.
pub const TOKEN_LENGTH_FIELD: u16 = 32;

/// Device tokens decode to exactly this many bytes.
pub const DEVICE_TOKEN_LEN: usize = 20;

/// The payload length field on the wire is a single byte.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Normalize a hex device token: strip whitespace separators, decode,
/// require exactly [`DEVICE_TOKEN_LEN`] bytes.
pub fn normalize_token(token: &str) -> Result<[u8; DEVICE_TOKEN_LEN], ApnsError> {
    let cleaned: String = token.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = hex::decode(&cleaned)
        .map_err(|e| ApnsError::InvalidToken(format!("not valid hex ({e}): {token:?}")))?;

    <[u8; DEVICE_TOKEN_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        ApnsError::InvalidToken(format!(
            "expected {DEVICE_TOKEN_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}

/// Encode a notification into a gateway frame:
/// `[u8 command=0][u16 BE token-length=32][20 token bytes][u8 payload-length][payload]`.
pub fn encode_push_frame(notification: &Notification) -> Result<Vec<u8>, ApnsError> {
    let token = normalize_token(&notification.device_token)?;
    let payload = notification.payload()?;

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ApnsError::PayloadTooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(4 + DEVICE_TOKEN_LEN + payload.len());
    frame.push(COMMAND_SEND);
    frame.extend_from_slice(&TOKEN_LENGTH_FIELD.to_be_bytes());
    frame.extend_from_slice(&token);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// One record from the feedback service: a device token APNs considers
/// dead, and when it decided so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
    /// Hex-encoded device token.
    pub device_token: String,
}

enum ReadOutcome {
    Full,
    Eof,
}

fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<ReadOutcome, ApnsError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(ReadOutcome::Eof),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(ReadOutcome::Full)
}

/// Drain a feedback stream to end-of-stream, decoding records in arrival
/// order: `[u32 BE timestamp][u16 BE token-length][token-length bytes]`.
///
/// The token-length field is treated as opaque; the protocol has carried
/// both 20- and 32-byte tokens over its lifetime. A stream that ends in the
/// middle of a record drops the partial record, which is the normal way the
/// server terminates the conversation.
pub fn decode_feedback_stream<R: Read>(mut reader: R) -> Result<Vec<FeedbackRecord>, ApnsError> {
    let mut records = Vec::new();

    loop {
        let mut header = [0u8; 6];
        if let ReadOutcome::Eof = read_exact_or_eof(&mut reader, &mut header)? {
            break;
        }

        let timestamp = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let token_len = u16::from_be_bytes([header[4], header[5]]) as usize;

        let mut token = vec![0u8; token_len];
        if let ReadOutcome::Eof = read_exact_or_eof(&mut reader, &mut token)? {
            break;
        }

        records.push(FeedbackRecord {
            timestamp,
            device_token: hex::encode(token),
        });
    }

    Ok(records)
}
