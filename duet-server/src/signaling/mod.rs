mod connection_hub;
mod event_sink;
mod ws_handler;

pub use connection_hub::*;
pub use event_sink::*;
pub use ws_handler::*;
