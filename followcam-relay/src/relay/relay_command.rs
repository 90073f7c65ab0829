use followcam_core::{PeerId, SignalMessage};
use tokio::sync::oneshot;

/// Команды, поступающие в релей от сигнального сервера (WebSocket).
#[derive(Debug)]
pub enum RelayCommand {
    /// Новое WebSocket соединение. Релей выдает ему PeerId.
    Connect { reply: oneshot::Sender<PeerId> },
    /// Разобранное сообщение от клиента.
    Message {
        peer_id: PeerId,
        message: SignalMessage,
    },
    /// Сигнал о разрыве WebSocket соединения.
    Disconnect { peer_id: PeerId },
}
