use serde_json::Value;
use tandem_core::{Envelope, PeerId};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Commands a room receives from connected peers.
///
/// `conn_id` identifies one attachment of a peer, so a late command from a
/// replaced connection can be told apart from the current one.
#[derive(Debug)]
pub enum RoomCommand {
    /// The peer sent `create or join`.
    CreateOrJoin {
        peer_id: PeerId,
        conn_id: Uuid,
        outbox: mpsc::UnboundedSender<Envelope>,
    },

    /// A `message` payload to hand to the other occupant.
    Relay {
        peer_id: PeerId,
        conn_id: Uuid,
        data: Value,
    },

    /// The peer's connection closed.
    Disconnect { peer_id: PeerId, conn_id: Uuid },
}
