use crate::room::{RoomCommand, RoomManager};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{ConnectError, ConnectParams, PeerId, RelayConnector, RelayLink, event};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct RelayInner {
    rooms: RoomManager,
    token: Option<String>,
}

/// Routes relay events between peers and rooms.
///
/// Every attached peer gets its own task that turns its events into
/// [`RoomCommand`]s. WebSocket connections and in-process clients go
/// through the same path.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new() -> Self {
        Self::with_token(None)
    }

    pub fn with_token(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                rooms: RoomManager::new(),
                token,
            }),
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.inner.rooms
    }

    pub fn authorize(&self, token: Option<&str>) -> bool {
        match &self.inner.token {
            Some(expected) => token == Some(expected.as_str()),
            None => true,
        }
    }

    /// Attaches a peer and returns the peer's end of the link.
    pub fn attach(&self, peer_id: PeerId) -> RelayLink {
        let (peer_end, relay_end) = RelayLink::duplex();
        tokio::spawn(self.clone().serve(relay_end, peer_id));
        peer_end
    }

    /// Serves one attachment until the peer's end is dropped.
    pub async fn serve(self, mut link: RelayLink, peer_id: PeerId) {
        let conn_id = Uuid::new_v4();
        let mut room: Option<(String, mpsc::Sender<RoomCommand>)> = None;
        debug!("Peer {} attached ({})", peer_id, conn_id);

        while let Some(envelope) = link.recv().await {
            match envelope.event.as_str() {
                event::CREATE_OR_JOIN => {
                    let Some(room_id) = envelope.data.as_ref().and_then(|v| v.as_str()) else {
                        warn!("`create or join` from {} without room", peer_id);
                        continue;
                    };
                    if let Some((current, room_tx)) = &mut room
                        && current != room_id
                    {
                        info!("{} moves from room {} to {}", peer_id, current, room_id);
                        let cmd = RoomCommand::Disconnect {
                            peer_id: peer_id.clone(),
                            conn_id,
                        };
                        self.send_to_room(current, room_tx, cmd).await;
                    }

                    let mut room_tx = self.inner.rooms.get_room_sender(room_id);
                    let cmd = RoomCommand::CreateOrJoin {
                        peer_id: peer_id.clone(),
                        conn_id,
                        outbox: link.sender(),
                    };
                    if !self.send_to_room(room_id, &mut room_tx, cmd).await {
                        warn!("Room {} died", room_id);
                        continue;
                    }
                    room = Some((room_id.to_string(), room_tx));
                }
                event::MESSAGE => {
                    let (Some((room_id, room_tx)), Some(data)) = (&mut room, envelope.data) else {
                        warn!("Dropping message from {} outside any room", peer_id);
                        continue;
                    };
                    let cmd = RoomCommand::Relay {
                        peer_id: peer_id.clone(),
                        conn_id,
                        data,
                    };
                    if !self.send_to_room(room_id, room_tx, cmd).await {
                        warn!("Room died while relaying for {}", peer_id);
                    }
                }
                other => debug!("Ignoring `{}` from {}", other, peer_id),
            }
        }

        if let Some((room_id, mut room_tx)) = room {
            let cmd = RoomCommand::Disconnect {
                peer_id: peer_id.clone(),
                conn_id,
            };
            self.send_to_room(&room_id, &mut room_tx, cmd).await;
        }
        debug!("Peer {} detached ({})", peer_id, conn_id);
    }

    /// Sends `cmd` to `room_id`. A room that evicted itself since `room_tx`
    /// was looked up is replaced by the current one and the send retried once.
    async fn send_to_room(
        &self,
        room_id: &str,
        room_tx: &mut mpsc::Sender<RoomCommand>,
        cmd: RoomCommand,
    ) -> bool {
        let Err(mpsc::error::SendError(cmd)) = room_tx.send(cmd).await else {
            return true;
        };
        debug!("Room {} was evicted; resolving again", room_id);
        *room_tx = self.inner.rooms.get_room_sender(room_id);
        room_tx.send(cmd).await.is_ok()
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects clients to this relay in-process.
#[async_trait]
impl RelayConnector for RelayService {
    async fn connect(&self, params: &ConnectParams) -> Result<RelayLink, ConnectError> {
        params.validate()?;
        if !self.authorize(Some(&params.auth_token)) {
            return Err(ConnectError::Transport("unauthorized".to_string()));
        }
        Ok(self.attach(params.peer_id.clone()))
    }
}
