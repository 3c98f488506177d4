mod connection;
mod handlers;
mod session;

pub use connection::ConnectionSupervisor;
pub use session::{Session, SessionEvent};
