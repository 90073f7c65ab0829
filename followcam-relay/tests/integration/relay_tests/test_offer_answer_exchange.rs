use followcam_core::{IceCandidate, Role, SessionDescription, SignalMessage, StreamId};
use followcam_relay::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};

#[tokio::test]
async fn test_offer_answer_exchange() {
    init_tracing();

    let (cmd_tx, mut delivered_rx, signaling) = create_test_relay();
    let stream_id = StreamId::from("camerone");

    let sender = connect_peer(&cmd_tx).await;
    let viewer = connect_peer(&cmd_tx).await;

    cmd_tx
        .send(RelayCommand::Message {
            peer_id: sender,
            message: SignalMessage::directory_request(Role::Sender, stream_id.clone()),
        })
        .await
        .unwrap();

    cmd_tx
        .send(RelayCommand::Message {
            peer_id: viewer,
            message: SignalMessage::directory_request(Role::Viewer, stream_id.clone()),
        })
        .await
        .unwrap();

    // Sender is prompted on behalf of the viewer
    let prompt = delivered_rx.recv().await.unwrap();
    assert_eq!(prompt.to, sender);
    assert_eq!(prompt.message, SignalMessage::offer_prompt(viewer));

    // Offer travels sender -> viewer
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: sender,
            message: SignalMessage::description(
                viewer,
                Some(stream_id.clone()),
                SessionDescription::offer("offer-sdp"),
            ),
        })
        .await
        .unwrap();

    let offer = delivered_rx.recv().await.unwrap();
    assert_eq!(offer.to, viewer);
    assert_eq!(
        offer.message,
        SignalMessage::Description {
            peer_id: Some(sender),
            stream_id: None,
            description: SessionDescription::offer("offer-sdp"),
        }
    );

    // Answer and a candidate travel viewer -> sender
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: viewer,
            message: SignalMessage::description(
                sender,
                Some(stream_id.clone()),
                SessionDescription::answer("answer-sdp"),
            ),
        })
        .await
        .unwrap();
    cmd_tx
        .send(RelayCommand::Message {
            peer_id: viewer,
            message: SignalMessage::candidate(sender, Some(stream_id), IceCandidate::new("cand")),
        })
        .await
        .unwrap();

    let answer = delivered_rx.recv().await.unwrap();
    let candidate = delivered_rx.recv().await.unwrap();
    assert_eq!(answer.to, sender);
    assert_eq!(candidate.to, sender);
    assert_eq!(candidate.message.peer_id(), Some(viewer));
    assert_eq!(candidate.message.stream_id(), None);

    assert_eq!(signaling.delivered_to(&sender).await.len(), 3);
    assert_eq!(signaling.delivered_to(&viewer).await.len(), 1);
}
