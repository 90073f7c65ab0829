use crate::relay::{Relay, RelayCommand};
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use followcam_core::{PeerId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

const RELAY_COMMAND_BUFFER: usize = 256;

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_cmd_tx: mpsc::Sender<RelayCommand>,
}

impl SignalingService {
    pub fn new(relay_cmd_tx: mpsc::Sender<RelayCommand>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
            relay_cmd_tx,
        }
    }

    /// Spawns the relay actor and returns the service that feeds it.
    pub fn start() -> Self {
        let (relay_cmd_tx, relay_cmd_rx) = mpsc::channel(RELAY_COMMAND_BUFFER);
        let service = Self::new(relay_cmd_tx);

        let relay = Relay::new(relay_cmd_rx, Arc::new(service.clone()));
        tokio::spawn(relay.run());

        service
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn send_signal(&self, peer_id: PeerId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(&peer_id) {
            match msg.to_json() {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!("Attempted to send signal to disconnected user {}", peer_id);
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, peer_id: PeerId, message: SignalMessage) {
        self.send_signal(peer_id, message);
    }
}
