use followcam_client::{ClientEvent, SessionState};
use followcam_core::{PeerId, Role, SignalMessage, StreamId};

use crate::integration::{init_tracing, start_test_session};

#[tokio::test]
async fn test_open_sends_directory_request() {
    init_tracing();

    let mut session = start_test_session();
    let stream_id = StreamId::from("abcdefgh");

    session.handle.open(stream_id.clone(), Role::Viewer).unwrap();
    let mut relay = session.next_relay().await;

    assert_eq!(
        relay.recv().await,
        SignalMessage::OfferRequest {
            peer_id: None,
            stream_id: Some(stream_id.clone()),
        }
    );
    session.wait_for_state(SessionState::Connecting).await;
    session.wait_for_state(SessionState::Connected).await;

    // The first id sticks for this connection
    let assigned = PeerId::new();
    relay.send(&SignalMessage::UuidAssign { peer_id: assigned });
    relay.send(&SignalMessage::UuidAssign {
        peer_id: PeerId::new(),
    });
    relay.send_text("{not json");

    let event = session
        .wait_for(|event| matches!(event, ClientEvent::PeerIdAssigned(_)))
        .await;
    assert_eq!(event, ClientEvent::PeerIdAssigned(assigned));

    // Reopening as sender drops the old link without a reconnect
    session.handle.open(stream_id.clone(), Role::Sender).unwrap();
    let mut relay = session.next_relay().await;
    assert_eq!(relay.recv().await, SignalMessage::Seed { stream_id });
    assert_eq!(session.connector.attempts(), 2);
    assert_eq!(session.handle.local_peer_id(), Some(assigned));
}
