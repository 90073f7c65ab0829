mod client_event;
mod outbox;
mod session;
mod session_command;

pub use client_event::*;
pub use outbox::*;
pub use session::*;
pub use session_command::*;
