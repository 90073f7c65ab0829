use followcam_client::PeerPhase;
use followcam_core::{IceCandidate, PeerId, SdpType, SessionDescription, StreamId};

use crate::integration::{create_test_orchestrator, init_tracing};
use crate::utils::{EngineCall, FAKE_OFFER_SDP, Sent};

#[tokio::test]
async fn test_viewer_answer_flow() {
    init_tracing();

    let (mut orchestrator, _channels, engine, _signaling, mut sent_rx) =
        create_test_orchestrator();
    let sender = PeerId::new();
    orchestrator.set_stream(Some(StreamId::from("abcdefgh")));

    // Candidates from the sender arrive before its offer
    orchestrator.on_candidate(sender, IceCandidate::new("early-1")).await;
    orchestrator.on_candidate(sender, IceCandidate::new("early-2")).await;
    assert_eq!(orchestrator.buffered(&sender), 2);

    let offer = SessionDescription::offer(FAKE_OFFER_SDP);
    orchestrator.on_offer(sender, offer.clone()).await;

    let Some(Sent::Description { to, description, .. }) = sent_rx.recv().await else {
        panic!("expected an answer to be sent");
    };
    assert_eq!(to, sender);
    assert_eq!(description.sdp_type, SdpType::Answer);
    assert!(description.sdp.contains("c=IN IP4 0.0.0.0\r\nb=AS:12000\r\n"));

    let connection = engine.connection_for(&sender).unwrap();
    assert_eq!(
        connection.calls(),
        vec![
            EngineCall::SetRemote(offer),
            EngineCall::CreateAnswer,
            EngineCall::SetLocal(description),
            EngineCall::AddCandidate(IceCandidate::new("early-1")),
            EngineCall::AddCandidate(IceCandidate::new("early-2")),
        ]
    );
    assert_eq!(orchestrator.phase(&sender), Some(PeerPhase::AnswerSent));
    assert_eq!(orchestrator.buffered(&sender), 0);
}
