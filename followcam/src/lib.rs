pub use followcam_core::{PeerId, Role, StreamId};

pub mod model {
    pub use followcam_core::model::*;
    pub use followcam_core::sdp;
}

#[cfg(feature = "server")]
pub mod server {
    pub use followcam_relay::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use followcam_client::*;
}
