use clap::Parser;
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "0.0.0.0:8443";

#[derive(Parser, Debug, Clone)]
#[command(name = "followcam-relay")]
#[command(about = "Signaling relay pairing FollowCam senders with their viewers")]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to.
    #[arg(long, env = "FOLLOWCAM_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Log filter, e.g. `info` or `followcam_relay=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
