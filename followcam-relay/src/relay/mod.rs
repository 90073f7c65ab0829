mod directory;
mod relay;
mod relay_command;

pub use directory::*;
pub use relay::*;
pub use relay_command::*;
