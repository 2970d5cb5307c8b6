use std::fs;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};

use openssl::pkey::PKey;
use openssl::ssl::{SslConnector, SslMethod, SslStream, SslVerifyMode};
use openssl::x509::X509;
use tracing::{debug, info};

use crate::config::{ApnsConfig, Flow};
use crate::error::ApnsError;
use crate::frame::{self, FeedbackRecord};
use crate::notification::Notification;

/// Apple Push Notification Service binary-protocol client
///
/// Owns at most one TLS connection per flow (gateway, feedback),
/// established lazily on first use and reused for the lifetime of the
/// instance. Single-threaded and blocking throughout; callers needing
/// concurrent sends use independent instances.
pub struct ApnsClient {
    config: ApnsConfig,
    gateway: Option<SslStream<TcpStream>>,
    feedback: Option<SslStream<TcpStream>>,
}

impl ApnsClient {
    /// Create a client; no connection is opened until first use
    pub fn new(config: ApnsConfig) -> Self {
        Self {
            config,
            gateway: None,
            feedback: None,
        }
    }

    pub fn config(&self) -> &ApnsConfig {
        &self.config
    }

    /// Mutable access to the configuration. Changes apply to connections
    /// opened afterwards; sockets already open are unaffected.
    pub fn config_mut(&mut self) -> &mut ApnsConfig {
        &mut self.config
    }

    /// Encode a notification and write the frame to the gateway connection.
    ///
    /// Fire-and-forget: the simple-format protocol returns no per-frame
    /// acknowledgment, and the frame carries no identifier a later error
    /// response could be correlated with. Validation failures
    /// ([`ApnsError::InvalidToken`], [`ApnsError::PayloadTooLarge`]) occur
    /// before any bytes are written.
    pub fn send(&mut self, notification: &Notification) -> Result<(), ApnsError> {
        let frame = frame::encode_push_frame(notification)?;

        let stream = self.stream(Flow::Gateway)?;
        stream.write_all(&frame)?;
        stream.flush()?;

        let token_prefix = notification
            .device_token
            .chars()
            .take(8)
            .collect::<String>();
        debug!(
            token_prefix = %token_prefix,
            frame_len = frame.len(),
            "gateway frame written"
        );

        Ok(())
    }

    /// Drain the feedback service until end-of-stream and return the dead
    /// tokens in arrival order. The feedback connection is closed once the
    /// server ends the stream; a later call opens a fresh one.
    pub fn feedback(&mut self) -> Result<Vec<FeedbackRecord>, ApnsError> {
        let stream = self.stream(Flow::Feedback)?;
        let records = frame::decode_feedback_stream(stream)?;

        if let Some(mut stream) = self.feedback.take() {
            let _ = stream.shutdown();
        }

        info!(records = records.len(), "feedback stream drained");
        Ok(records)
    }

    fn stream(&mut self, flow: Flow) -> Result<&mut SslStream<TcpStream>, ApnsError> {
        let slot = match flow {
            Flow::Gateway => &mut self.gateway,
            Flow::Feedback => &mut self.feedback,
        };

        let stream = match slot.take() {
            Some(stream) => stream,
            None => Self::connect(&self.config, flow)?,
        };
        Ok(slot.insert(stream))
    }

    fn connect(config: &ApnsConfig, flow: Flow) -> Result<SslStream<TcpStream>, ApnsError> {
        let (host, port) = config.environment().endpoint(flow);
        let connector = Self::tls_connector(config)?;

        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            ApnsError::Connection(format!("failed to resolve {host}:{port}: {e}"))
        })?;

        let mut last_err = None;
        let mut tcp = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.timeout()) {
                Ok(stream) => {
                    tcp = Some(stream);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let tcp = tcp.ok_or_else(|| {
            ApnsError::Connection(match last_err {
                Some(e) => format!("failed to connect to {host}:{port}: {e}"),
                None => format!("{host}:{port} resolved to no addresses"),
            })
        })?;

        let mut tls = connector
            .configure()
            .map_err(|e| ApnsError::Connection(format!("TLS configuration failed: {e}")))?;
        // The gateway's trust model rests on the client certificate; the
        // server's certificate is not verified (legacy protocol behavior,
        // with SslVerifyMode::NONE set on the context).
        tls.set_verify_hostname(false);

        let stream = tls.connect(host, tcp).map_err(|e| {
            ApnsError::Connection(format!("TLS handshake with {host}:{port} failed: {e}"))
        })?;

        info!(
            host,
            port,
            environment = ?config.environment(),
            flow = ?flow,
            "APNs connection established"
        );
        Ok(stream)
    }

    /// Build an SSL connector with the client-certificate identity loaded
    /// from the configured combined PEM (certificate + private key).
    fn tls_connector(config: &ApnsConfig) -> Result<SslConnector, ApnsError> {
        let pem = fs::read(config.certificate_path()).map_err(|e| {
            ApnsError::Connection(format!(
                "failed to read certificate {}: {e}",
                config.certificate_path().display()
            ))
        })?;

        let mut certs = X509::stack_from_pem(&pem)
            .map_err(|e| ApnsError::Connection(format!("certificate parse failed: {e}")))?
            .into_iter();
        let cert = certs.next().ok_or_else(|| {
            ApnsError::Connection(format!(
                "no certificate found in {}",
                config.certificate_path().display()
            ))
        })?;

        let key = match config.passphrase() {
            Some(passphrase) => PKey::private_key_from_pem_passphrase(&pem, passphrase.as_bytes()),
            None => PKey::private_key_from_pem(&pem),
        }
        .map_err(|e| ApnsError::Connection(format!("private key parse failed: {e}")))?;

        let mut builder = SslConnector::builder(SslMethod::tls_client())
            .map_err(|e| ApnsError::Connection(format!("TLS context init failed: {e}")))?;
        builder
            .set_certificate(&cert)
            .map_err(|e| ApnsError::Connection(format!("failed to set certificate: {e}")))?;
        for chain_cert in certs {
            builder
                .add_extra_chain_cert(chain_cert)
                .map_err(|e| ApnsError::Connection(format!("failed to add chain cert: {e}")))?;
        }
        builder
            .set_private_key(&key)
            .map_err(|e| ApnsError::Connection(format!("failed to set private key: {e}")))?;
        builder
            .check_private_key()
            .map_err(|e| ApnsError::Connection(format!("key does not match certificate: {e}")))?;
        builder.set_verify(SslVerifyMode::NONE);

        Ok(builder.build())
    }
}

impl Drop for ApnsClient {
    fn drop(&mut self) {
        // Best-effort close on teardown; shutdown errors are deliberately
        // ignored here and nowhere else.
        if let Some(mut stream) = self.gateway.take() {
            let _ = stream.shutdown();
        }
        if let Some(mut stream) = self.feedback.take() {
            let _ = stream.shutdown();
        }
    }
}
