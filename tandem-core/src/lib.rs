pub mod error;
pub mod model;
pub mod transport;

pub use error::ConnectError;
pub use model::*;
pub use transport::{ConnectParams, RelayConnector, RelayLink};
