mod server;
mod service;
mod ws_handler;

pub use server::*;
pub use service::*;
pub use ws_handler::*;
