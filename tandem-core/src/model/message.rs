use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptionMessage {
    pub kind: SdpKind,
    pub sdp: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidateMessage {
    #[serde(rename = "label")]
    pub media_line_index: u16,
    #[serde(rename = "id")]
    pub mid: String,
    pub candidate: String,
    pub room: String,
}

/// Payload of the relay `message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayMessage {
    Offer { room: String, sdp: String },
    Answer { room: String, sdp: String },
    Candidate(IceCandidateMessage),
}

impl RelayMessage {
    pub fn room(&self) -> &str {
        match self {
            Self::Offer { room, .. } | Self::Answer { room, .. } => room,
            Self::Candidate(candidate) => &candidate.room,
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate(_) => "candidate",
        }
    }
}

impl From<SessionDescriptionMessage> for RelayMessage {
    fn from(msg: SessionDescriptionMessage) -> Self {
        match msg.kind {
            SdpKind::Offer => Self::Offer {
                room: msg.room,
                sdp: msg.sdp,
            },
            SdpKind::Answer => Self::Answer {
                room: msg.room,
                sdp: msg.sdp,
            },
        }
    }
}

impl From<IceCandidateMessage> for RelayMessage {
    fn from(msg: IceCandidateMessage) -> Self {
        Self::Candidate(msg)
    }
}
