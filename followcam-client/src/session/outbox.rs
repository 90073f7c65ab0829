use crate::orchestrator::OutboundSignaling;
use async_trait::async_trait;
use followcam_core::{IceCandidate, PeerId, SessionDescription, SignalMessage, StreamId};
use tokio::sync::mpsc;

/// Queues the orchestrator's outbound messages for the session loop,
/// which writes them to whatever relay link is open at that moment.
#[derive(Debug, Clone)]
pub struct OutboxSignaling {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl OutboxSignaling {
    pub fn new(tx: mpsc::UnboundedSender<SignalMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl OutboundSignaling for OutboxSignaling {
    async fn send_description(
        &self,
        to: PeerId,
        stream_id: Option<StreamId>,
        description: SessionDescription,
    ) {
        let _ = self
            .tx
            .send(SignalMessage::description(to, stream_id, description));
    }

    async fn send_candidate(&self, to: PeerId, stream_id: Option<StreamId>, candidate: IceCandidate) {
        let _ = self.tx.send(SignalMessage::candidate(to, stream_id, candidate));
    }
}
