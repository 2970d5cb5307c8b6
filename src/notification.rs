use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApnsError;

/// Alert content: a plain display string or a structured alert dictionary
/// (`title`, `loc-key`, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Alert {
    Plain(String),
    Structured(Map<String, Value>),
}

impl From<&str> for Alert {
    fn from(text: &str) -> Self {
        Alert::Plain(text.to_string())
    }
}

impl From<String> for Alert {
    fn from(text: String) -> Self {
        Alert::Plain(text)
    }
}

impl From<Map<String, Value>> for Alert {
    fn from(dict: Map<String, Value>) -> Self {
        Alert::Structured(dict)
    }
}

/// APNs Notification
///
/// Transient value: constructed, encoded into a gateway frame, sent,
/// discarded. The device token is a hex string; whitespace separators are
/// tolerated and stripped during encoding.
#[derive(Debug, Clone)]
pub struct Notification {
    pub device_token: String,
    pub alert: Alert,
    pub badge: Option<u32>,
    pub sound: String,
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Create a notification with default sound and no badge
    pub fn new(device_token: impl Into<String>, alert: impl Into<Alert>) -> Self {
        Self {
            device_token: device_token.into(),
            alert: alert.into(),
            badge: None,
            sound: "default".to_string(),
            extra: Map::new(),
        }
    }

    /// Set badge count shown on the app icon
    pub fn with_badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Override the default sound
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    /// Add a custom key merged at the top level of the payload
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Serialized JSON payload: extras at the top level, `aps` set last so
    /// a colliding extra key cannot shadow it.
    pub(crate) fn payload(&self) -> Result<Vec<u8>, ApnsError> {
        let mut aps = Map::new();
        aps.insert("alert".to_string(), serde_json::to_value(&self.alert)?);
        aps.insert("sound".to_string(), Value::String(self.sound.clone()));
        if let Some(badge) = self.badge {
            aps.insert("badge".to_string(), Value::from(badge));
        }

        let mut root = self.extra.clone();
        root.insert("aps".to_string(), Value::Object(aps));

        Ok(serde_json::to_vec(&Value::Object(root))?)
    }
}
