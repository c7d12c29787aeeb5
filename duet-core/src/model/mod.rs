mod conn;
mod disconnect;
mod event;
mod room;

pub use conn::ConnId;
pub use disconnect::DisconnectReason;
pub use event::{ClientEvent, ProtocolError, ServerEvent};
pub use room::RoomKey;
