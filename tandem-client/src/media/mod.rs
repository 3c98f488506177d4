mod rtc_session;

pub use rtc_session::{RtcMediaFactory, RtcMediaSession};

use crate::error::MediaError;
use async_trait::async_trait;
use tandem_core::{IceCandidateMessage, SdpKind};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub mid: String,
    pub media_line_index: u16,
    pub candidate: String,
}

impl From<IceCandidateMessage> for IceCandidate {
    fn from(msg: IceCandidateMessage) -> Self {
        Self {
            mid: msg.mid,
            media_line_index: msg.media_line_index,
            candidate: msg.candidate,
        }
    }
}

/// The local end of one media connection, as seen by the negotiation core.
///
/// Capture, encoding and rendering live behind this trait.
#[async_trait]
pub trait MediaSession: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError>;

    async fn create_answer(&self) -> Result<SessionDescription, MediaError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), MediaError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), MediaError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), MediaError>;

    async fn dispose(&self);
}

/// Builds a fresh media session for every start of the call.
#[async_trait]
pub trait MediaSessionFactory: Send + Sync {
    type Session: MediaSession + 'static;

    /// Locally discovered candidates must be pushed into `candidates`.
    async fn create(
        &self,
        candidates: mpsc::UnboundedSender<IceCandidate>,
    ) -> Result<Self::Session, MediaError>;
}
