mod message;
mod peer;
mod room;
mod signaling;
mod state;

pub use message::{IceCandidateMessage, RelayMessage, SdpKind, SessionDescriptionMessage};
pub use peer::{Participant, PeerId, Role};
pub use room::Room;
pub use signaling::{DEFAULT_STUN_ADDR, Envelope, IceServerConfig, event};
pub use state::SignalingState;
