mod engine;
mod flags;
mod ice;

pub use engine::{NegotiationEngine, NegotiationPhase};
pub use flags::NegotiationFlags;
pub use ice::IceExchange;
