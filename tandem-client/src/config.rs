use serde::{Deserialize, Serialize};
use std::time::Duration;
use tandem_core::{ConnectParams, IceServerConfig, PeerId, Room};

pub const DEFAULT_MAX_RETRY: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Disconnects tolerated before the session is restarted.
    pub max_retry: u32,
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub relay_url: String,
    pub path: String,
    pub auth_token: String,
    pub peer_id: PeerId,
    pub room: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(relay_url: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            room: room.into(),
            ..Self::default()
        }
    }

    pub fn with_peer_id(mut self, peer_id: impl Into<PeerId>) -> Self {
        self.peer_id = peer_id.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            base_url: self.relay_url.clone(),
            path: self.path.clone(),
            auth_token: self.auth_token.clone(),
            peer_id: self.peer_id.clone(),
            room: Room::new(self.room.clone()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:3000".to_string(),
            path: "/tandem/ws".to_string(),
            auth_token: String::new(),
            peer_id: PeerId::new(),
            room: "DEFAULT".to_string(),
            ice_servers: vec![IceServerConfig::default()],
            retry: RetryPolicy::default(),
        }
    }
}
