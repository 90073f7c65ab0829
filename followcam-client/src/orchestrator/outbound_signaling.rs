use async_trait::async_trait;
use followcam_core::{IceCandidate, PeerId, SessionDescription, StreamId};

/// Интерфейс для отправки сообщений удаленному пиру через релей.
#[async_trait]
pub trait OutboundSignaling: Send + Sync {
    /// Отправить offer или answer.
    async fn send_description(
        &self,
        to: PeerId,
        stream_id: Option<StreamId>,
        description: SessionDescription,
    );

    /// Отправить локальный ICE-кандидат.
    async fn send_candidate(&self, to: PeerId, stream_id: Option<StreamId>, candidate: IceCandidate);
}
