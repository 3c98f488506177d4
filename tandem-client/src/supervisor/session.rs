use super::handlers;
use crate::error::{CallError, ProtocolError};
use crate::media::{IceCandidate, MediaSession};
use crate::negotiation::NegotiationEngine;
use crate::room::RoomCoordinator;
use crate::signaling::{ChannelEvent, Dispatcher, Handler, SignalingChannel};
use crate::status::StatusReporter;
use tandem_core::Envelope;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug)]
pub enum SessionEvent {
    Relay(Envelope),
    LocalCandidate(IceCandidate),
    RetryDue,
}

/// Everything that belongs to one start of the call. Dropped as a whole on
/// restart.
pub struct Session<M> {
    pub(super) channel: SignalingChannel,
    dispatcher: Dispatcher<Session<M>>,
    pub(super) room: RoomCoordinator,
    pub(super) engine: NegotiationEngine<M>,
    candidates: mpsc::UnboundedReceiver<IceCandidate>,
    pub(super) status: StatusReporter,
    pub(super) max_retry: u32,
}

impl<M: MediaSession + 'static> Session<M> {
    pub fn new(
        channel: SignalingChannel,
        room: RoomCoordinator,
        engine: NegotiationEngine<M>,
        candidates: mpsc::UnboundedReceiver<IceCandidate>,
        status: StatusReporter,
        max_retry: u32,
    ) -> Self {
        let mut dispatcher = Dispatcher::new();
        handlers::register(&mut dispatcher);

        Self {
            channel,
            dispatcher,
            room,
            engine,
            candidates,
            status,
            max_retry,
        }
    }

    pub fn channel(&self) -> &SignalingChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut SignalingChannel {
        &mut self.channel
    }

    pub fn room(&self) -> &RoomCoordinator {
        &self.room
    }

    pub fn engine(&self) -> &NegotiationEngine<M> {
        &self.engine
    }

    /// Overrides the handler for a relay event.
    pub fn on(&mut self, event: &'static str, handler: Handler<Session<M>>) {
        self.dispatcher.on(event, handler);
    }

    /// Waits for the next relay frame, local candidate or reconnect tick.
    /// Cancel-safe.
    pub async fn next_event(&mut self) -> SessionEvent {
        tokio::select! {
            biased;
            event = self.channel.next_event() => match event {
                ChannelEvent::Relay(envelope) => SessionEvent::Relay(envelope),
                ChannelEvent::RetryDue => SessionEvent::RetryDue,
            },
            Some(candidate) = self.candidates.recv() => SessionEvent::LocalCandidate(candidate),
        }
    }

    /// Runs the handler for `event` to completion.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<(), CallError> {
        match event {
            SessionEvent::Relay(envelope) => {
                debug!("Relay event `{}`", envelope.event);
                let handler = self
                    .dispatcher
                    .handler(&envelope.event)
                    .ok_or_else(|| ProtocolError::UnknownEvent(envelope.event.clone()))?;
                handler(self, envelope.data).await
            }
            SessionEvent::LocalCandidate(candidate) => {
                self.engine.on_local_candidate(&self.channel, candidate);
                Ok(())
            }
            SessionEvent::RetryDue => {
                self.channel.reconnect().await;
                Ok(())
            }
        }
    }

    /// Disconnects the relay, cancelling any pending reconnect, then
    /// releases the media session.
    pub async fn close(mut self) {
        self.channel.disconnect();
        self.engine.dispose().await;
        info!("Session for room {} closed", self.room.room());
    }
}
