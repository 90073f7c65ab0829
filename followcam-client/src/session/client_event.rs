use crate::capture::TrackKind;
use crate::stats::StatsSnapshot;
use followcam_core::PeerId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Streaming,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Streaming => "streaming",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// События сессии для приложения (UI).
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StateChanged(SessionState),

    /// Релей назначил локальный PeerId для текущего соединения.
    PeerIdAssigned(PeerId),

    RemoteTrack { peer_id: PeerId, kind: TrackKind },

    Stats(StatsSnapshot),

    /// Сообщение об ошибке для пользователя.
    Error(String),
}
