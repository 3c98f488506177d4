use crate::room::room_command::RoomCommand;
use crate::room::room_manager::RoomManager;
use serde_json::Value;
use tandem_core::{Envelope, PeerId, Room as RoomId, event};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Member {
    peer_id: PeerId,
    conn_id: Uuid,
    outbox: mpsc::UnboundedSender<Envelope>,
}

impl Member {
    fn send(&self, envelope: Envelope) {
        if self.outbox.send(envelope).is_err() {
            debug!("Outbox of {} closed", self.peer_id);
        }
    }
}

/// A two-seat room. The first occupant is told `created`, the second
/// `joined` (and the first `join`); anyone after that gets `full`.
///
/// Once the last occupant leaves, the room evicts itself from its manager
/// and stops.
pub struct Room {
    id: RoomId,
    members: Vec<Member>,
    command_rx: mpsc::Receiver<RoomCommand>,
    manager: RoomManager,
    handle: mpsc::WeakSender<RoomCommand>,
}

impl Room {
    pub fn new(
        id: &str,
        command_rx: mpsc::Receiver<RoomCommand>,
        manager: RoomManager,
        handle: mpsc::WeakSender<RoomCommand>,
    ) -> Self {
        Self {
            id: RoomId::new(id),
            members: Vec::with_capacity(RoomId::CAPACITY),
            command_rx,
            manager,
            handle,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} event loop started", self.id);

        while let Some(cmd) = self.command_rx.recv().await {
            if self.handle_command(cmd) && self.members.is_empty() {
                self.retire().await;
                break;
            }
        }

        info!("Room {} event loop finished", self.id);
    }

    /// Leaves the manager, then hands commands that were already queued to
    /// whichever room now owns the id.
    async fn retire(&mut self) {
        if let Some(handle) = self.handle.upgrade() {
            self.manager.evict(self.id.id(), &handle);
        }
        self.command_rx.close();

        let mut successor: Option<mpsc::Sender<RoomCommand>> = None;
        while let Some(cmd) = self.command_rx.recv().await {
            let tx = successor.get_or_insert_with(|| self.manager.get_room_sender(self.id.id()));
            if tx.send(cmd).await.is_err() {
                warn!("Successor of room {} is gone", self.id);
            }
        }
        info!("Room {} is empty; evicted", self.id);
    }

    fn room_data(&self) -> Option<Value> {
        Some(Value::String(self.id.id().to_string()))
    }

    /// Returns `true` when a member left.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::CreateOrJoin {
                peer_id,
                conn_id,
                outbox,
            } => self.create_or_join(peer_id, conn_id, outbox),

            RoomCommand::Relay {
                peer_id,
                conn_id,
                data,
            } => {
                if !self.is_current(&peer_id, conn_id) {
                    warn!("Dropping message from {} outside room {}", peer_id, self.id);
                    return false;
                }
                let envelope = Envelope::new(event::MESSAGE, Some(data));
                for member in self.members.iter().filter(|m| m.peer_id != peer_id) {
                    member.send(envelope.clone());
                }
            }

            RoomCommand::Disconnect { peer_id, conn_id } => {
                let before = self.members.len();
                self.members
                    .retain(|m| !(m.peer_id == peer_id && m.conn_id == conn_id));
                if self.members.len() < before {
                    info!("{} left room {}", peer_id, self.id);
                    return true;
                }
                debug!("Stale disconnect from {} ignored", peer_id);
            }
        }
        false
    }

    fn create_or_join(
        &mut self,
        peer_id: PeerId,
        conn_id: Uuid,
        outbox: mpsc::UnboundedSender<Envelope>,
    ) {
        let data = self.room_data();

        if let Some(seat) = self.members.iter().position(|m| m.peer_id == peer_id) {
            info!("{} rejoined room {}", peer_id, self.id);
            let member = &mut self.members[seat];
            member.conn_id = conn_id;
            member.outbox = outbox;
            let ack = if seat == 0 { event::CREATED } else { event::JOINED };
            member.send(Envelope::new(ack, data));
            return;
        }

        let newcomer = Member {
            peer_id,
            conn_id,
            outbox,
        };
        match self.members.len() {
            0 => {
                info!("{} created room {}", newcomer.peer_id, self.id);
                newcomer.send(Envelope::new(event::CREATED, data));
                self.members.push(newcomer);
            }
            n if n < RoomId::CAPACITY => {
                info!("{} joined room {}", newcomer.peer_id, self.id);
                for member in &self.members {
                    member.send(Envelope::new(event::JOIN, data.clone()));
                }
                newcomer.send(Envelope::new(event::JOINED, data));
                self.members.push(newcomer);
            }
            _ => {
                warn!("Room {} is full; turning away {}", self.id, newcomer.peer_id);
                newcomer.send(Envelope::new(event::FULL, data));
            }
        }
    }

    fn is_current(&self, peer_id: &PeerId, conn_id: Uuid) -> bool {
        self.members
            .iter()
            .any(|m| &m.peer_id == peer_id && m.conn_id == conn_id)
    }
}
