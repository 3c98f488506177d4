use super::flags::NegotiationFlags;
use super::ice::IceExchange;
use crate::error::{CallError, NegotiationError, NegotiationStage, ProtocolError};
use crate::media::{IceCandidate, MediaSession, SessionDescription};
use crate::signaling::SignalingChannel;
use crate::status::StatusReporter;
use tandem_core::{RelayMessage, Room, SignalingState};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationPhase {
    #[default]
    Idle,
    Offering,
    LocalDescriptionSet,
    AwaitingAnswer,
    ReceivedOffer,
    CreatingAnswer,
    Established,
}

impl NegotiationPhase {
    fn in_flight(&self) -> bool {
        matches!(self, Self::Offering | Self::CreatingAnswer)
    }
}

/// Offer/answer exchange over one media session.
///
/// Initiator: Idle -> Offering -> LocalDescriptionSet -> AwaitingAnswer -> Established.
/// Responder: Idle -> ReceivedOffer -> CreatingAnswer -> LocalDescriptionSet -> Established.
pub struct NegotiationEngine<M> {
    media: M,
    room: Room,
    flags: NegotiationFlags,
    phase: NegotiationPhase,
    ice: IceExchange,
    status: StatusReporter,
    disposed: bool,
}

impl<M: MediaSession> NegotiationEngine<M> {
    pub fn new(media: M, room: Room, status: StatusReporter) -> Self {
        Self {
            ice: IceExchange::new(room.clone()),
            media,
            room,
            flags: NegotiationFlags::default(),
            phase: NegotiationPhase::Idle,
            status,
            disposed: false,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn flags(&self) -> NegotiationFlags {
        self.flags
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn ice(&self) -> &IceExchange {
        &self.ice
    }

    pub fn set_initiator(&mut self) {
        self.flags.is_initiator = true;
    }

    pub fn mark_channel_ready(&mut self) {
        self.flags.is_channel_ready = true;
    }

    /// Starts negotiation once both peers are present. Idempotent; returns
    /// whether this call was the one that started it.
    pub async fn maybe_start(&mut self, channel: &SignalingChannel) -> Result<bool, CallError> {
        if !self.flags.can_start() {
            debug!(
                "Not starting negotiation (started: {}, channel ready: {})",
                self.flags.is_started, self.flags.is_channel_ready
            );
            return Ok(false);
        }

        self.flags.is_started = true;
        info!(
            "Negotiation started in room {} (initiator: {})",
            self.room, self.flags.is_initiator
        );
        if self.flags.is_initiator {
            self.create_offer(channel).await?;
        }
        Ok(true)
    }

    pub async fn create_offer(&mut self, channel: &SignalingChannel) -> Result<(), CallError> {
        if self.phase.in_flight() {
            return Err(ProtocolError::NegotiationInFlight("create offer").into());
        }
        if self.phase != NegotiationPhase::Idle {
            return Err(ProtocolError::LocalDescriptionAlreadySet("create offer").into());
        }

        self.phase = NegotiationPhase::Offering;
        self.status.report(SignalingState::Offering);

        let offer = self
            .media
            .create_offer()
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::CreateOffer, e))?;
        self.media
            .set_local_description(offer.clone())
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::SetLocalDescription, e))?;
        self.phase = NegotiationPhase::LocalDescriptionSet;

        channel.emit_message(&RelayMessage::Offer {
            room: self.room.id().to_string(),
            sdp: offer.sdp,
        });
        self.phase = NegotiationPhase::AwaitingAnswer;
        debug!("Offer sent; awaiting answer");
        Ok(())
    }

    pub async fn on_remote_offer(
        &mut self,
        channel: &SignalingChannel,
        sdp: String,
    ) -> Result<(), CallError> {
        if self.flags.is_initiator {
            return Err(ProtocolError::OfferToInitiator.into());
        }
        if self.phase != NegotiationPhase::Idle {
            return Err(ProtocolError::DuplicateOffer.into());
        }

        self.status.report(SignalingState::ReceivedOffer);
        // An offer can only come from the other occupant.
        self.flags.is_channel_ready = true;
        if !self.flags.is_started {
            self.maybe_start(channel).await?;
        }

        self.phase = NegotiationPhase::ReceivedOffer;
        self.media
            .set_remote_description(SessionDescription::offer(sdp))
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::SetRemoteDescription, e))?;
        self.ice.on_remote_description_set(&self.media).await;

        self.create_answer(channel).await
    }

    pub async fn create_answer(&mut self, channel: &SignalingChannel) -> Result<(), CallError> {
        if self.phase.in_flight() {
            return Err(ProtocolError::NegotiationInFlight("create answer").into());
        }
        if self.phase != NegotiationPhase::ReceivedOffer {
            return Err(if self.ice.remote_description_set() {
                ProtocolError::LocalDescriptionAlreadySet("create answer")
            } else {
                ProtocolError::RemoteDescriptionMissing
            }
            .into());
        }

        self.phase = NegotiationPhase::CreatingAnswer;
        self.status.report(SignalingState::CreatingAnswer);

        let answer = self
            .media
            .create_answer()
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::CreateAnswer, e))?;
        self.media
            .set_local_description(answer.clone())
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::SetLocalDescription, e))?;
        self.phase = NegotiationPhase::LocalDescriptionSet;

        channel.emit_message(&RelayMessage::Answer {
            room: self.room.id().to_string(),
            sdp: answer.sdp,
        });
        self.establish();
        Ok(())
    }

    pub async fn on_remote_answer(&mut self, sdp: String) -> Result<(), CallError> {
        if !self.flags.is_started {
            return Err(ProtocolError::AnswerBeforeStart.into());
        }
        match self.phase {
            NegotiationPhase::AwaitingAnswer => {}
            NegotiationPhase::Established if self.flags.is_initiator => {
                return Err(ProtocolError::DuplicateAnswer.into());
            }
            _ => return Err(ProtocolError::AnswerWithoutOffer.into()),
        }

        self.status.report(SignalingState::ReceivedAnswer);
        self.media
            .set_remote_description(SessionDescription::answer(sdp))
            .await
            .map_err(|e| NegotiationError::new(NegotiationStage::SetRemoteDescription, e))?;
        self.ice.on_remote_description_set(&self.media).await;

        self.establish();
        Ok(())
    }

    pub async fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        if self.phase != NegotiationPhase::Established {
            self.status.report(SignalingState::ReceivedCandidate);
        }
        self.ice
            .receive(&self.media, self.flags.is_started, candidate)
            .await;
    }

    pub fn on_local_candidate(&self, channel: &SignalingChannel, candidate: IceCandidate) {
        self.ice.send_local(channel, candidate);
    }

    /// Releases the media session. Later calls are no-ops.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.media.dispose().await;
    }

    fn establish(&mut self) {
        self.phase = NegotiationPhase::Established;
        info!("Negotiation established in room {}", self.room);
        self.status.report(SignalingState::Established);
    }
}
