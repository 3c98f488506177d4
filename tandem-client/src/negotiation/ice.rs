use crate::media::{IceCandidate, MediaSession};
use crate::signaling::SignalingChannel;
use std::collections::VecDeque;
use tandem_core::{IceCandidateMessage, RelayMessage, Room};
use tracing::{debug, warn};

/// Candidate exchange for one negotiation.
///
/// Remote candidates are held back until the remote description is set,
/// then applied in arrival order.
pub struct IceExchange {
    room: Room,
    remote_description_set: bool,
    pending: VecDeque<IceCandidate>,
    applied: usize,
}

impl IceExchange {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            remote_description_set: false,
            pending: VecDeque::new(),
            applied: 0,
        }
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn send_local(&self, channel: &SignalingChannel, candidate: IceCandidate) {
        debug!("Sending local candidate {}", candidate.candidate);
        let msg = IceCandidateMessage {
            media_line_index: candidate.media_line_index,
            mid: candidate.mid,
            candidate: candidate.candidate,
            room: self.room.id().to_string(),
        };
        channel.emit_message(&RelayMessage::Candidate(msg));
    }

    pub async fn receive<M: MediaSession>(
        &mut self,
        media: &M,
        is_started: bool,
        candidate: IceCandidate,
    ) {
        if self.remote_description_set && is_started {
            self.apply(media, candidate).await;
        } else {
            debug!(
                "Buffering remote candidate until the remote description is set ({} pending)",
                self.pending.len() + 1
            );
            self.pending.push_back(candidate);
        }
    }

    /// Flushes the buffer in arrival order and switches to immediate apply.
    pub async fn on_remote_description_set<M: MediaSession>(&mut self, media: &M) {
        self.remote_description_set = true;
        if !self.pending.is_empty() {
            debug!("Applying {} buffered candidates", self.pending.len());
        }
        while let Some(candidate) = self.pending.pop_front() {
            self.apply(media, candidate).await;
        }
    }

    async fn apply<M: MediaSession>(&mut self, media: &M, candidate: IceCandidate) {
        let line = candidate.candidate.clone();
        match media.add_ice_candidate(candidate).await {
            Ok(()) => self.applied += 1,
            Err(e) => warn!("Failed to add ICE candidate {}: {}", line, e),
        }
    }
}
