pub use tandem_core::{PeerId, Role, Room, SignalingState};

pub mod model {
    pub use tandem_core::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_client::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use tandem_relay::*;
}
