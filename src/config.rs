use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ApnsError;

/// Default connection-establishment timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Target environment for both flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

/// The two connection flows of the binary protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Outbound notification frames.
    Gateway,
    /// Inbound dead-token records.
    Feedback,
}

impl Environment {
    /// Fixed host:port for a flow in this environment.
    pub fn endpoint(self, flow: Flow) -> (&'static str, u16) {
        match (self, flow) {
            (Environment::Production, Flow::Gateway) => ("gateway.push.apple.com", 2195),
            (Environment::Sandbox, Flow::Gateway) => ("gateway.sandbox.push.apple.com", 2195),
            (Environment::Production, Flow::Feedback) => ("feedback.push.apple.com", 2196),
            (Environment::Sandbox, Flow::Feedback) => ("feedback.sandbox.push.apple.com", 2196),
        }
    }
}

impl FromStr for Environment {
    type Err = ApnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "sandbox" | "development" => Ok(Environment::Sandbox),
            other => Err(ApnsError::Config(format!(
                "unknown APNs environment {other:?} (expected \"production\" or \"sandbox\")"
            ))),
        }
    }
}

/// APNs Configuration
///
/// The certificate path is fixed at construction; passphrase, environment
/// and timeout stay adjustable. Changing any of them does not affect a
/// connection that is already open.
#[derive(Debug, Clone)]
pub struct ApnsConfig {
    certificate_path: PathBuf,
    certificate_passphrase: Option<String>,
    environment: Environment,
    timeout: Duration,
}

impl ApnsConfig {
    /// Create new APNs configuration
    pub fn new(certificate_path: impl Into<PathBuf>, environment: Environment) -> Self {
        Self {
            certificate_path: certificate_path.into(),
            certificate_passphrase: None,
            environment,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set certificate passphrase
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.certificate_passphrase = Some(passphrase.into());
        self
    }

    /// Set connection-establishment timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    ///
    /// **Environment Variables**:
    /// - `APNS_CERT_PATH`: Path to the combined PEM (certificate + key), required
    /// - `APNS_CERT_PASSPHRASE`: Private-key passphrase (optional)
    /// - `APNS_ENVIRONMENT`: `production` or `sandbox` (default: sandbox)
    /// - `APNS_TIMEOUT_SECS`: Connect timeout in seconds (default: 10)
    pub fn from_env() -> Result<Self, ApnsError> {
        let certificate_path = std::env::var("APNS_CERT_PATH").map_err(|_| {
            ApnsError::Config("APNS_CERT_PATH not set - client certificate required".to_string())
        })?;

        let environment = match std::env::var("APNS_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Sandbox,
        };

        let timeout_secs = std::env::var("APNS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|e| ApnsError::Config(format!("invalid APNS_TIMEOUT_SECS: {e}")))?;
        if timeout_secs == 0 {
            return Err(ApnsError::Config(
                "APNS_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        let mut config = Self::new(certificate_path, environment)
            .with_timeout(Duration::from_secs(timeout_secs));
        if let Ok(passphrase) = std::env::var("APNS_CERT_PASSPHRASE") {
            config.certificate_passphrase = Some(passphrase);
        }

        Ok(config)
    }

    pub fn certificate_path(&self) -> &Path {
        &self.certificate_path
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.certificate_passphrase.as_deref()
    }

    pub fn set_passphrase(&mut self, passphrase: Option<String>) {
        self.certificate_passphrase = passphrase;
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
