use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_PATH: &str = "/tandem/ws";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub listen: String,
    pub path: String,
    /// When set, connections must present this token.
    pub token: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            path: DEFAULT_PATH.to_string(),
            token: None,
        }
    }
}
