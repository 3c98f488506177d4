mod config;
mod error;
mod media;
mod negotiation;
mod room;
mod signaling;
mod status;
mod supervisor;

pub use config::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use room::*;
pub use signaling::*;
pub use status::*;
pub use supervisor::*;
