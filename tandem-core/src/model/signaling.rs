use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::RelayMessage;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Relay event names.
pub mod event {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const CREATE_OR_JOIN: &str = "create or join";
    pub const CREATED: &str = "created";
    pub const FULL: &str = "full";
    pub const JOIN: &str = "join";
    pub const JOINED: &str = "joined";
    pub const MESSAGE: &str = "message";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_STUN_ADDR.to_string()],
            username: None,
            credential: None,
        }
    }
}

/// One named event travelling over the relay connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn bare(event: impl Into<String>) -> Self {
        Self::new(event, None)
    }

    pub fn message(msg: &RelayMessage) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event::MESSAGE, Some(serde_json::to_value(msg)?)))
    }

    pub fn is(&self, event: &str) -> bool {
        self.event == event
    }
}
