pub mod relay_tests;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::Level;

use followcam_core::PeerId;
use followcam_relay::{Relay, RelayCommand, SignalingService, router};

use crate::utils::{Delivered, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_relay() -> (
    mpsc::Sender<RelayCommand>,
    mpsc::UnboundedReceiver<Delivered>,
    MockSignalingOutput,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RelayCommand>(100);
    let (signaling, delivered_rx) = MockSignalingOutput::new();

    let relay = Relay::new(cmd_rx, Arc::new(signaling.clone()));

    tokio::spawn(async move {
        relay.run().await;
    });

    (cmd_tx, delivered_rx, signaling)
}

pub async fn connect_peer(cmd_tx: &mpsc::Sender<RelayCommand>) -> PeerId {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(RelayCommand::Connect { reply })
        .await
        .expect("Relay is not running");
    rx.await.expect("Relay dropped connect request")
}

/// Bind the full HTTP router on an ephemeral port.
pub async fn start_test_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    let app = router(SignalingService::start());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    addr
}
