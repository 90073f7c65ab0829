pub mod model;
pub mod sdp;

pub use model::*;
