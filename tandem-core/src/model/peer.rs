use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Negotiation role of the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    /// Creates the offer.
    Initiator,
    /// Answers the offer.
    Responder,
    #[default]
    Unassigned,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
            Role::Unassigned => "unassigned",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub peer_id: PeerId,
    role: Role,
}

impl Participant {
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            role: Role::Unassigned,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fixes the role for the rest of the session.
    ///
    /// Returns the already assigned role if one was decided earlier.
    pub fn assign(&mut self, role: Role) -> Result<(), Role> {
        match self.role {
            Role::Unassigned => {
                self.role = role;
                Ok(())
            }
            current => Err(current),
        }
    }
}
