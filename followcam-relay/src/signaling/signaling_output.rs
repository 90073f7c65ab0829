use followcam_core::{PeerId, SignalMessage};
use async_trait::async_trait;

/// Трейт, который должна реализовать внешняя система (WebSocket сервер),
/// чтобы релей мог доставлять сообщения клиентам.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Доставить сообщение конкретному пользователю.
    async fn deliver(&self, peer_id: PeerId, message: SignalMessage);
}
