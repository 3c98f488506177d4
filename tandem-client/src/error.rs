use std::fmt;
use tandem_core::{ConnectError, Role};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("webrtc: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("{0}")]
    Other(String),
}

/// A relay message that is malformed or makes no sense in the current state.
///
/// Always recovered locally: the message is logged and dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed `{event}` payload: {source}")]
    Malformed {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{0}` event without payload")]
    MissingPayload(&'static str),

    #[error("no handler for event `{0}`")]
    UnknownEvent(String),

    #[error("message for room `{got}` while in room `{expected}`")]
    WrongRoom { expected: String, got: String },

    #[error("answer received before negotiation started")]
    AnswerBeforeStart,

    #[error("answer received with no outstanding offer")]
    AnswerWithoutOffer,

    #[error("duplicate answer")]
    DuplicateAnswer,

    #[error("offer received by the initiator")]
    OfferToInitiator,

    #[error("duplicate offer")]
    DuplicateOffer,

    #[error("role already assigned: {0}")]
    RoleAlreadyAssigned(Role),

    #[error("room is full")]
    RoomFull,

    #[error("{0} rejected: negotiation already in flight")]
    NegotiationInFlight(&'static str),

    #[error("{0} rejected: local description already set")]
    LocalDescriptionAlreadySet(&'static str),

    #[error("answer requested before the remote offer was applied")]
    RemoteDescriptionMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStage {
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
}

impl fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateOffer => "create offer",
            Self::CreateAnswer => "create answer",
            Self::SetLocalDescription => "set local description",
            Self::SetRemoteDescription => "set remote description",
        };
        f.write_str(name)
    }
}

/// Local SDP work failed; the session has no defined next transition.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct NegotiationError {
    pub stage: NegotiationStage,
    #[source]
    pub source: MediaError,
}

impl NegotiationError {
    pub fn new(stage: NegotiationStage, source: MediaError) -> Self {
        Self { stage, source }
    }
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("signaling protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("negotiation error: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("reconnect attempts exhausted after {attempts} disconnects")]
    RetryExhausted { attempts: u32 },

    #[error("no active session")]
    NoSession,
}

impl CallError {
    /// Errors that leave the session without a defined next transition.
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::Negotiation(_) | Self::RetryExhausted { .. })
    }
}
