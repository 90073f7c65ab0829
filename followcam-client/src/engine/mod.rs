mod encoder;
mod engine_event;
mod peer_engine;
mod rtc;
mod stats_entry;

pub use encoder::*;
pub use engine_event::*;
pub use peer_engine::*;
pub use rtc::*;
pub use stats_entry::*;
