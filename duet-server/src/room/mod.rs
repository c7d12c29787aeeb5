mod coordinator;
mod relay;
mod room_command;
mod room_registry;

pub use coordinator::*;
pub use relay::*;
pub use room_command::*;
pub use room_registry::*;
