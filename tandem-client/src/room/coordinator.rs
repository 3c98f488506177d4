use crate::error::ProtocolError;
use tandem_core::{Participant, PeerId, Role, Room, SignalingState};
use tracing::{info, warn};

/// Room membership as seen by the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Disconnected,
    Connecting,
    Connected,
    /// Sole occupant.
    Created,
    /// The second participant arrived.
    Joining,
    /// We arrived second.
    Joined,
    /// Rejected as a third participant.
    Full,
}

impl Membership {
    pub fn status(&self) -> SignalingState {
        match self {
            Self::Disconnected => SignalingState::Disconnected,
            Self::Connecting => SignalingState::Connecting,
            Self::Connected => SignalingState::Connected,
            Self::Created => SignalingState::Created,
            Self::Joining => SignalingState::Joining,
            Self::Joined => SignalingState::Joined,
            Self::Full => SignalingState::Full,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

pub struct RoomCoordinator {
    room: Room,
    local: Participant,
    membership: Membership,
}

impl RoomCoordinator {
    pub fn new(room: Room, peer_id: PeerId) -> Self {
        Self {
            room,
            local: Participant::new(peer_id),
            membership: Membership::Disconnected,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn role(&self) -> Role {
        self.local.role()
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    pub fn participant(&self) -> &Participant {
        &self.local
    }

    fn ensure_usable(&self) -> Result<(), ProtocolError> {
        if self.membership.is_full() {
            return Err(ProtocolError::RoomFull);
        }
        Ok(())
    }

    fn transition(&mut self, next: Membership) -> SignalingState {
        self.membership = next;
        next.status()
    }

    pub fn on_connecting(&mut self) -> SignalingState {
        self.transition(Membership::Connecting)
    }

    pub fn on_connected(&mut self) -> SignalingState {
        self.transition(Membership::Connected)
    }

    pub fn on_disconnected(&mut self) -> SignalingState {
        if self.membership == Membership::Full {
            return SignalingState::Full;
        }
        self.transition(Membership::Disconnected)
    }

    /// Relay ack for the sole occupant. Fixes the role to Initiator.
    pub fn on_created(&mut self) -> Result<SignalingState, ProtocolError> {
        self.ensure_usable()?;
        self.local
            .assign(Role::Initiator)
            .map_err(ProtocolError::RoleAlreadyAssigned)?;
        info!("Created room {}; acting as initiator", self.room);
        Ok(self.transition(Membership::Created))
    }

    /// A second participant is present. Without an earlier ack this peer
    /// is the one who arrived second, so it takes the Responder role.
    pub fn on_peer_joined(&mut self) -> Result<SignalingState, ProtocolError> {
        self.ensure_usable()?;
        if self.local.role() == Role::Unassigned {
            self.local
                .assign(Role::Responder)
                .map_err(ProtocolError::RoleAlreadyAssigned)?;
            info!("Joined room {}; acting as responder", self.room);
        } else {
            info!("Peer joined room {}", self.room);
        }
        Ok(self.transition(Membership::Joining))
    }

    /// Relay ack for the second occupant. Fixes the role to Responder.
    pub fn on_joined(&mut self) -> Result<SignalingState, ProtocolError> {
        self.ensure_usable()?;
        self.local
            .assign(Role::Responder)
            .map_err(ProtocolError::RoleAlreadyAssigned)?;
        info!("Joined room {}; acting as responder", self.room);
        Ok(self.transition(Membership::Joined))
    }

    pub fn on_full(&mut self) -> SignalingState {
        warn!("Room {} is full; session not usable", self.room);
        self.transition(Membership::Full)
    }
}
