use crate::relay::directory::StreamDirectory;
use crate::relay::relay_command::RelayCommand;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Single owner of the stream directory. All socket tasks talk to it through
/// `RelayCommand`s, so directory updates never race each other.
pub struct Relay {
    directory: StreamDirectory,
    command_rx: mpsc::Receiver<RelayCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            directory: StreamDirectory::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { reply } => {
                let peer_id = self.directory.connect();
                info!(
                    "Peer {} connected ({} connected)",
                    peer_id,
                    self.directory.peer_count()
                );

                if reply.send(peer_id).is_err() {
                    warn!("Socket for {} went away before its id was assigned", peer_id);
                    self.directory.disconnect(peer_id);
                }
            }

            RelayCommand::Message { peer_id, message } => {
                for delivery in self.directory.handle(peer_id, message) {
                    self.signaling.deliver(delivery.to, delivery.message).await;
                }
            }

            RelayCommand::Disconnect { peer_id } => {
                self.directory.disconnect(peer_id);
            }
        }
    }
}
