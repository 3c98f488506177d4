use super::session::Session;
use crate::error::{CallError, ProtocolError};
use crate::media::MediaSession;
use crate::signaling::Dispatcher;
use futures::future::BoxFuture;
use serde_json::Value;
use tandem_core::{RelayMessage, event};
use tracing::warn;

pub(super) fn register<M: MediaSession + 'static>(dispatcher: &mut Dispatcher<Session<M>>) {
    dispatcher.on(event::CONNECT, on_connect::<M>);
    dispatcher.on(event::CREATED, on_created::<M>);
    dispatcher.on(event::FULL, on_full::<M>);
    dispatcher.on(event::JOIN, on_join::<M>);
    dispatcher.on(event::JOINED, on_joined::<M>);
    dispatcher.on(event::MESSAGE, on_message::<M>);
    dispatcher.on(event::DISCONNECT, on_disconnect::<M>);
}

fn on_connect<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        session.channel.mark_connected();
        session.status.report(session.room.on_connected());

        let room = session.room.room().id().to_string();
        session
            .channel
            .emit(event::CREATE_OR_JOIN, Some(Value::String(room)));
        Ok(())
    })
}

fn on_created<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        let state = session.room.on_created()?;
        session.engine.set_initiator();
        session.status.report(state);
        Ok(())
    })
}

fn on_full<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        session.status.report(session.room.on_full());
        Ok(())
    })
}

/// Another participant arrived in our room.
fn on_join<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        let state = session.room.on_peer_joined()?;
        session.status.report(state);
        session.engine.mark_channel_ready();
        session.engine.maybe_start(&session.channel).await?;
        Ok(())
    })
}

fn on_joined<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        let state = session.room.on_joined()?;
        session.status.report(state);
        session.engine.mark_channel_ready();
        session.engine.maybe_start(&session.channel).await?;
        Ok(())
    })
}

fn on_message<M: MediaSession + 'static>(
    session: &mut Session<M>,
    data: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        let data = data.ok_or(ProtocolError::MissingPayload(event::MESSAGE))?;
        let msg: RelayMessage =
            serde_json::from_value(data).map_err(|source| ProtocolError::Malformed {
                event: event::MESSAGE.to_string(),
                source,
            })?;

        let expected = session.room.room().id();
        if msg.room() != expected {
            return Err(ProtocolError::WrongRoom {
                expected: expected.to_string(),
                got: msg.room().to_string(),
            }
            .into());
        }
        if session.room.membership().is_full() {
            return Err(ProtocolError::RoomFull.into());
        }

        match msg {
            RelayMessage::Offer { sdp, .. } => {
                session.engine.on_remote_offer(&session.channel, sdp).await
            }
            RelayMessage::Answer { sdp, .. } => session.engine.on_remote_answer(sdp).await,
            RelayMessage::Candidate(candidate) => {
                session.engine.on_remote_candidate(candidate.into()).await;
                Ok(())
            }
        }
    })
}

fn on_disconnect<M: MediaSession + 'static>(
    session: &mut Session<M>,
    _: Option<Value>,
) -> BoxFuture<'_, Result<(), CallError>> {
    Box::pin(async move {
        session.status.report(session.room.on_disconnected());
        match session.channel.on_disconnect() {
            Ok(Some(attempt)) => {
                session.status.retrying(attempt, session.max_retry);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                warn!("Relay connection lost for good");
                Err(e)
            }
        }
    })
}
