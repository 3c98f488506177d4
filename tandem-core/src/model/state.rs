use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable signaling progress, reported to the status sink.
///
/// This is a projection for display; negotiation guards never read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalingState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Created,
    Joining,
    Joined,
    Full,
    Offering,
    ReceivedOffer,
    ReceivedAnswer,
    ReceivedCandidate,
    CreatingAnswer,
    Established,
}

impl SignalingState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Created => "Created",
            Self::Joining => "Joining...",
            Self::Joined => "Joined",
            Self::Full => "Full",
            Self::Offering => "Offering...",
            Self::ReceivedOffer => "ReceivedOffer",
            Self::ReceivedAnswer => "ReceivedAnswer",
            Self::ReceivedCandidate => "ReceivedCandidate",
            Self::CreatingAnswer => "CreatingAnswer...",
            Self::Established => "OK!",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Full | Self::Established)
    }
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
