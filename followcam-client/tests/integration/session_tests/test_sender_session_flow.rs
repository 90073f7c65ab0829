use followcam_client::{
    CONNECTION_FAILED_MESSAGE, ClientEvent, IceConnectionState, MediaTrack, SessionState,
    TrackKind,
};
use followcam_core::{IceCandidate, PeerId, Role, SdpType, SessionDescription, SignalMessage, StreamId};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{init_tracing, start_test_session};
use crate::utils::{EngineCall, FAKE_ANSWER_SDP, FAKE_OFFER_SDP, FakeTrack};

#[tokio::test(start_paused = true)]
async fn test_sender_session_flow() {
    init_tracing();

    let mut session = start_test_session();
    let stream_id = StreamId::from("abcdefgh");
    let camera = Arc::new(FakeTrack::video());

    session
        .handle
        .attach_local_media(vec![camera.clone() as Arc<dyn MediaTrack>])
        .unwrap();
    session.handle.open(stream_id.clone(), Role::Sender).unwrap();

    let mut relay = session.next_relay().await;
    assert_eq!(relay.recv().await, SignalMessage::Seed { stream_id: stream_id.clone() });

    // Relay prompts us on behalf of a viewer
    let viewer = PeerId::new();
    relay.send(&SignalMessage::offer_prompt(viewer));

    let SignalMessage::Description {
        peer_id,
        stream_id: sent_stream,
        description,
    } = relay.recv().await
    else {
        panic!("expected an offer");
    };
    assert_eq!(peer_id, Some(viewer));
    assert_eq!(sent_stream, Some(stream_id.clone()));
    assert_eq!(description.sdp_type, SdpType::Offer);
    assert!(description.sdp.contains("b=AS:12000"));

    // Offers are for viewers only: this one is ignored
    relay.send(&SignalMessage::Description {
        peer_id: Some(PeerId::new()),
        stream_id: None,
        description: SessionDescription::offer(FAKE_OFFER_SDP),
    });

    // Answer, then a batch of candidates
    let answer = SessionDescription::answer(FAKE_ANSWER_SDP);
    relay.send(&SignalMessage::Description {
        peer_id: Some(viewer),
        stream_id: None,
        description: answer.clone(),
    });
    relay.send(&SignalMessage::Candidates {
        peer_id: Some(viewer),
        stream_id: None,
        candidates: vec![IceCandidate::new("r1"), IceCandidate::new("r2")],
    });

    let connection = session.engine.connection_for(&viewer).unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while connection.applied_candidates().len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Remote candidates were never applied");

    // Engine gathers a local candidate
    connection.emit_candidate(IceCandidate::new("l1")).await;
    assert_eq!(
        relay.recv().await,
        SignalMessage::candidate(viewer, Some(stream_id), IceCandidate::new("l1"))
    );

    assert_eq!(session.engine.connections().len(), 1);
    assert!(connection.calls().contains(&EngineCall::SetRemote(answer)));
    assert_eq!(connection.applied_candidates(), vec!["r1", "r2"]);

    connection.emit_ice_state(IceConnectionState::Connected).await;
    session.wait_for_state(SessionState::Streaming).await;

    connection.emit_remote_track(TrackKind::Audio).await;
    let track = session
        .wait_for(|event| matches!(event, ClientEvent::RemoteTrack { .. }))
        .await;
    assert_eq!(
        track,
        ClientEvent::RemoteTrack {
            peer_id: viewer,
            kind: TrackKind::Audio,
        }
    );

    // Encoder gets pinned and stats start flowing
    let stats = session
        .wait_for(|event| matches!(event, ClientEvent::Stats(_)))
        .await;
    let ClientEvent::Stats(snapshot) = stats else {
        unreachable!();
    };
    assert_eq!(snapshot.resolution, Some((2560, 1440)));
    assert_eq!(snapshot.codec.as_deref(), Some("VP8"));
    assert_eq!(connection.encoder_updates().len(), 1);

    connection.emit_ice_state(IceConnectionState::Failed).await;
    let error = session
        .wait_for(|event| matches!(event, ClientEvent::Error(_)))
        .await;
    assert_eq!(error, ClientEvent::Error(CONNECTION_FAILED_MESSAGE.to_owned()));
    session.wait_for_state(SessionState::Failed).await;

    // Teardown closes the connection and stops local media
    session.handle.close().unwrap();
    session.wait_for_state(SessionState::Disconnected).await;
    assert!(connection.is_closed());
    assert!(camera.is_stopped());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(session.connector.attempts(), 1);
}
