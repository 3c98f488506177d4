mod channel;
mod dispatch;
mod ws_connector;

pub use channel::{ChannelEvent, SignalingChannel};
pub use dispatch::{Dispatcher, Handler};
pub use ws_connector::WsConnector;
