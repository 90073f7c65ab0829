mod peer;
mod role;
mod signaling;
mod stream;

pub use peer::PeerId;
pub use role::Role;
pub use signaling::{CodecError, IceCandidate, SdpType, SessionDescription, SignalMessage};
pub use stream::{STREAM_ID_LEN, StreamId};
