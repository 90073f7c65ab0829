mod constraints;
mod media;
mod policy;

pub use constraints::*;
pub use media::*;
pub use policy::*;
