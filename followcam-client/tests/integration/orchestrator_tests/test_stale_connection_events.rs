use followcam_client::{IceConnectionState, PeerPhase};
use followcam_core::{IceCandidate, PeerId, SessionDescription};
use std::sync::Arc;

use crate::integration::{create_test_orchestrator, init_tracing};
use crate::utils::{EngineCall, FAKE_ANSWER_SDP, FakeTrack, Sent};

#[tokio::test]
async fn test_stale_connection_events() {
    init_tracing();

    let (mut orchestrator, mut channels, engine, signaling, _sent_rx) =
        create_test_orchestrator();
    let viewer = PeerId::new();
    orchestrator.set_local_tracks(vec![Arc::new(FakeTrack::video())]);

    // Sender came back and the relay prompts for the same viewer again
    orchestrator.on_offer_requested(viewer).await;
    orchestrator.on_offer_requested(viewer).await;

    let connections = engine.connections();
    let (old, live) = (connections[0].clone(), connections[1].clone());
    assert_ne!(old.id.epoch, live.id.epoch);

    // The replaced connection reports its own shutdown late
    for state in [
        IceConnectionState::Connected,
        IceConnectionState::Failed,
        IceConnectionState::Closed,
    ] {
        old.emit_ice_state(state).await;
        let event = channels.engine_rx.recv().await.unwrap();
        assert_eq!(orchestrator.on_engine_event(event).await, None);
    }
    old.emit_candidate(IceCandidate::new("old-local")).await;
    let event = channels.engine_rx.recv().await.unwrap();
    assert_eq!(orchestrator.on_engine_event(event).await, None);

    assert_eq!(orchestrator.phase(&viewer), Some(PeerPhase::OfferSent));
    assert_eq!(orchestrator.peer_count(), 1);
    let sent = signaling.sent().await;
    assert!(!sent.iter().any(|sent| matches!(sent, Sent::Candidate { .. })));

    // Negotiation on the live connection still completes
    let answer = SessionDescription::answer(FAKE_ANSWER_SDP);
    orchestrator.on_answer(viewer, answer.clone()).await;
    orchestrator.on_candidate(viewer, IceCandidate::new("r1")).await;

    assert!(live.calls().contains(&EngineCall::SetRemote(answer)));
    assert_eq!(live.applied_candidates(), vec!["r1"]);
    assert_eq!(orchestrator.phase(&viewer), Some(PeerPhase::RemoteDescriptionSet));
    assert!(!live.is_closed());
}
