use crate::capture::MediaTrack;
use crate::engine::encoder::EncoderParameters;
use crate::engine::engine_event::{ConnectionId, ConnectionState, EngineEvent};
use crate::engine::stats_entry::StatsEntry;
use crate::error::EngineError;
use async_trait::async_trait;
use followcam_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Фабрика peer-connection. Каждый вызов дает новое независимое соединение,
/// события которого идут в `events` с пометкой `id`.
#[async_trait]
pub trait PeerEngine: Send + Sync {
    async fn create_connection(
        &self,
        id: ConnectionId,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerConnection>, EngineError>;
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn add_local_track(&self, track: Arc<dyn MediaTrack>) -> Result<(), EngineError>;

    /// Offer that sends local media and expects none back.
    async fn create_offer(&self) -> Result<String, EngineError>;

    async fn create_answer(&self) -> Result<String, EngineError>;

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn encoder_parameters(&self) -> Result<EncoderParameters, EngineError>;

    async fn set_encoder_parameters(&self, parameters: EncoderParameters)
    -> Result<(), EngineError>;

    async fn stats(&self) -> Result<Vec<StatsEntry>, EngineError>;

    fn state(&self) -> ConnectionState;

    async fn close(&self) -> Result<(), EngineError>;
}
