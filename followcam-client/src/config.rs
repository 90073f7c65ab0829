use followcam_core::StreamId;
use std::time::Duration;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:8443/ws";
pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun.cloudflare.com:3478",
];
pub const TARGET_BITRATE_KBPS: u32 = 12_000;
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const ENCODER_OPTIMIZE_DELAY: Duration = Duration::from_millis(1000);
pub const STATS_INTERVAL: Duration = Duration::from_millis(2000);

/// Настройки клиента: адрес релея, ICE серверы и тайминги.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub ice_servers: Vec<String>,
    pub target_bitrate_kbps: u32,
    pub reconnect_delay: Duration,
    /// Сколько ждать ответа релея на одну попытку подключения.
    pub connect_timeout: Duration,
    pub encoder_optimize_delay: Duration,
    pub stats_interval: Duration,
}

impl ClientConfig {
    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            ice_servers: DEFAULT_STUN_SERVERS.iter().map(|s| (*s).to_owned()).collect(),
            target_bitrate_kbps: TARGET_BITRATE_KBPS,
            reconnect_delay: RECONNECT_DELAY,
            connect_timeout: CONNECT_TIMEOUT,
            encoder_optimize_delay: ENCODER_OPTIMIZE_DELAY,
            stats_interval: STATS_INTERVAL,
        }
    }
}

/// Picks the stream a sender publishes under: the one given, or a fresh one.
pub fn resolve_stream_id(requested: Option<&str>) -> StreamId {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => StreamId::from(id),
        None => StreamId::generate(),
    }
}
