mod orchestrator;
mod outbound_signaling;
mod peer_phase;

pub use orchestrator::*;
pub use outbound_signaling::*;
pub use peer_phase::*;
