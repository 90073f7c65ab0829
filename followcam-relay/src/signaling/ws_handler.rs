use crate::{RelayCommand, SignalingService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use followcam_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let (reply_tx, reply_rx) = oneshot::channel();
    if let Err(e) = service
        .relay_cmd_tx
        .send(RelayCommand::Connect { reply: reply_tx })
        .await
    {
        error!("Relay died: {}", e);
        return;
    }
    let Ok(peer_id) = reply_rx.await else {
        error!("Relay dropped connect request");
        return;
    };

    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id, tx);
    service.send_signal(peer_id, SignalMessage::UuidAssign { peer_id });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match SignalMessage::from_json(&text) {
                        Ok(message) => {
                            let cmd = RelayCommand::Message { peer_id, message };
                            if let Err(e) = service.relay_cmd_tx.send(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Parse error from {}: {}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&peer_id);
    let _ = service
        .relay_cmd_tx
        .send(RelayCommand::Disconnect { peer_id })
        .await;

    info!("WebSocket disconnected: {}", peer_id);
}
