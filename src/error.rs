use thiserror::Error;

/// APNs Client Error Types
#[derive(Error, Debug)]
pub enum ApnsError {
    /// Socket or TLS establishment failure. Fatal to the send or drain
    /// attempt that triggered it; never retried internally.
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid device token: {0}")]
    InvalidToken(String),

    /// The payload length field on the wire is a single byte.
    #[error("payload is {0} bytes, exceeding the 255-byte frame limit")]
    PayloadTooLarge(usize),

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// Read or write failure on an established socket.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
