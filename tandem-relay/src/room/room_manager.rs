use crate::room::{Room, RoomCommand};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, mpsc::Sender<RoomCommand>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command sender for `room_id`, spawning the room on first use.
    pub fn get_room_sender(&self, room_id: &str) -> mpsc::Sender<RoomCommand> {
        if let Some(sender) = self.rooms.get(room_id)
            && !sender.is_closed()
        {
            return sender.clone();
        }

        self.rooms
            .entry(room_id.to_string())
            .and_modify(|sender| {
                if sender.is_closed() {
                    *sender = self.spawn_room(room_id);
                }
            })
            .or_insert_with(|| self.spawn_room(room_id))
            .clone()
    }

    /// Drops the entry for `room_id` if it still points at `handle`.
    pub fn evict(&self, room_id: &str, handle: &mpsc::Sender<RoomCommand>) {
        if self
            .rooms
            .remove_if(room_id, |_, sender| sender.same_channel(handle))
            .is_some()
        {
            info!("Removed room: {}", room_id);
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn spawn_room(&self, room_id: &str) -> mpsc::Sender<RoomCommand> {
        info!("Creating new room: {}", room_id);
        let (tx, rx) = mpsc::channel(100);
        let room = Room::new(room_id, rx, self.clone(), tx.downgrade());
        tokio::spawn(room.run());
        tx
    }
}
