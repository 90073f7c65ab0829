use crate::capture::TrackKind;
use followcam_core::{IceCandidate, PeerId};
use std::fmt;

/// Один экземпляр peer-connection: удаленный пир и номер попытки.
/// Новое соединение с тем же пиром получает новую эпоху.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    pub remote: PeerId,
    pub epoch: u64,
}

impl ConnectionId {
    pub fn new(remote: PeerId, epoch: u64) -> Self {
        Self { remote, epoch }
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.remote, self.epoch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// События, которые движок генерирует для оркестратора.
/// Каждое помечено соединением, которое его породило.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Сгенерирован локальный ICE-кандидат, его нужно отправить удаленному пиру.
    LocalCandidate(ConnectionId, IceCandidate),

    /// Изменилось состояние ICE соединения.
    IceStateChanged(ConnectionId, IceConnectionState),

    /// Удаленный пир прислал медиа трек.
    RemoteTrack(ConnectionId, TrackKind),
}

impl EngineEvent {
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            Self::LocalCandidate(id, _) | Self::IceStateChanged(id, _) | Self::RemoteTrack(id, _) => {
                *id
            }
        }
    }
}
