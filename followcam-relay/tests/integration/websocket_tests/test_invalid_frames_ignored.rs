use followcam_core::{Role, SignalMessage, StreamId};

use crate::integration::{init_tracing, start_test_server};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_invalid_frames_ignored() {
    init_tracing();

    let addr = start_test_server().await;
    let stream_id = StreamId::from("garbled1");

    let mut sender = WsTestClient::connect(addr).await.expect("sender connect");
    sender.send_text("not json at all").await.unwrap();
    sender.send_text(r#"{"request":"seed"}"#).await.unwrap();
    sender.send_text("{}").await.unwrap();

    // The connection survives and keeps working
    sender
        .send(&SignalMessage::directory_request(Role::Sender, stream_id.clone()))
        .await
        .unwrap();

    let mut viewer = WsTestClient::connect(addr).await.expect("viewer connect");
    viewer
        .send(&SignalMessage::directory_request(Role::Viewer, stream_id))
        .await
        .unwrap();

    let prompt = sender.recv().await.expect("offer prompt");
    assert_eq!(prompt, SignalMessage::offer_prompt(viewer.peer_id));
}
