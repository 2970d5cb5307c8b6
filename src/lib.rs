//! Client for the legacy Apple Push Notification Service binary protocol.
//!
//! It handles:
//! - Client-certificate TLS connections to the gateway and feedback
//!   endpoints (production or sandbox)
//! - Encoding notifications into simple-format binary frames
//! - Draining the feedback service into dead-token records
//! - Support for badges, sounds and custom payload keys
//!
//! One TLS connection per flow is opened lazily and kept for the lifetime
//! of the client. All I/O is synchronous and blocking; there is no queueing,
//! retry or batching. Retry policy belongs to the caller.
//!
//! ```no_run
//! use apns_legacy::{ApnsClient, ApnsConfig, Environment, Notification};
//!
//! # fn main() -> Result<(), apns_legacy::ApnsError> {
//! let config = ApnsConfig::new("/etc/apns/cert.pem", Environment::Sandbox)
//!     .with_passphrase("secret");
//! let mut client = ApnsClient::new(config);
//!
//! client.send(&Notification::new("0123456789abcdef".repeat(2) + "01234567", "Hello").with_badge(1))?;
//!
//! for record in client.feedback()? {
//!     println!("{} went dead at {}", record.device_token, record.timestamp);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod notification;

pub use client::ApnsClient;
pub use config::{ApnsConfig, Environment, Flow, DEFAULT_TIMEOUT};
pub use error::ApnsError;
pub use frame::FeedbackRecord;
pub use notification::{Alert, Notification};
