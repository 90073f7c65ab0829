mod buffer;
mod capture;
mod config;
mod engine;
mod error;
mod orchestrator;
mod session;
mod stats;
mod transport;

pub use buffer::*;
pub use capture::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use orchestrator::*;
pub use session::*;
pub use stats::*;
pub use transport::*;
