use std::time::Duration;

use followcam_core::{IceCandidate, PeerId, SessionDescription, SignalMessage};
use followcam_relay::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};

#[tokio::test]
async fn test_unroutable_messages_dropped() {
    init_tracing();

    let (cmd_tx, mut delivered_rx, signaling) = create_test_relay();
    let peer = connect_peer(&cmd_tx).await;
    let gone = connect_peer(&cmd_tx).await;

    cmd_tx
        .send(RelayCommand::Disconnect { peer_id: gone })
        .await
        .unwrap();

    // Addressed to a peer that already left
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: peer,
            message: SignalMessage::description(gone, None, SessionDescription::offer("x")),
        })
        .await
        .unwrap();

    // Addressed to a peer that never existed
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: peer,
            message: SignalMessage::candidate(PeerId::new(), None, IceCandidate::new("c")),
        })
        .await
        .unwrap();

    // No target at all
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: peer,
            message: SignalMessage::Candidate {
                peer_id: None,
                stream_id: None,
                candidate: IceCandidate::new("c"),
            },
        })
        .await
        .unwrap();

    // Relay still serves the peer afterwards
    let other = connect_peer(&cmd_tx).await;
    assert_ne!(other, peer);

    let nothing = tokio::time::timeout(Duration::from_millis(100), delivered_rx.recv()).await;
    assert!(nothing.is_err(), "Nothing should have been delivered");
    assert_eq!(signaling.count().await, 0);
}
