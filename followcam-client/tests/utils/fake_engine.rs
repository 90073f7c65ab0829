use async_trait::async_trait;
use followcam_client::{
    ConnectionId, ConnectionState, EncoderParameters, EngineError, EngineEvent,
    IceConnectionState, MediaTrack, PeerConnection, PeerEngine, StatsEntry, TrackKind,
    VideoRtpStats,
};
use followcam_core::{IceCandidate, PeerId, SessionDescription};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Offer with a 2 Mbps video line the orchestrator must replace.
pub const FAKE_OFFER_SDP: &str = "v=0\r\n\
o=- 1 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
c=IN IP4 0.0.0.0\r\n\
b=AS:2000\r\n\
a=mid:1\r\n";

pub const FAKE_ANSWER_SDP: &str = "v=0\r\n\
o=- 3 4 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:1\r\n";

/// Everything the orchestrator asked a connection to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    AddTrack(TrackKind),
    CreateOffer,
    CreateAnswer,
    SetLocal(SessionDescription),
    SetRemote(SessionDescription),
    AddCandidate(IceCandidate),
    SetEncoder(EncoderParameters),
    Close,
}

pub struct FakeConnection {
    pub id: ConnectionId,
    pub remote: PeerId,
    calls: Mutex<Vec<EngineCall>>,
    events: mpsc::Sender<EngineEvent>,
    closed: AtomicBool,
    has_video: AtomicBool,
    fail_remote_description: bool,
    bytes: AtomicU64,
}

impl FakeConnection {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Candidate strings in the order they were applied.
    pub fn applied_candidates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::AddCandidate(c) => Some(c.candidate),
                _ => None,
            })
            .collect()
    }

    pub fn encoder_updates(&self) -> Vec<EncoderParameters> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::SetEncoder(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Simulate the engine reporting something for this connection.
    pub async fn emit(&self, event: EngineEvent) {
        self.events.send(event).await.expect("Engine event channel closed");
    }

    pub async fn emit_candidate(&self, candidate: IceCandidate) {
        self.emit(EngineEvent::LocalCandidate(self.id, candidate)).await;
    }

    pub async fn emit_ice_state(&self, state: IceConnectionState) {
        self.emit(EngineEvent::IceStateChanged(self.id, state)).await;
    }

    pub async fn emit_remote_track(&self, kind: TrackKind) {
        self.emit(EngineEvent::RemoteTrack(self.id, kind)).await;
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PeerConnection for FakeConnection {
    async fn add_local_track(&self, track: Arc<dyn MediaTrack>) -> Result<(), EngineError> {
        if track.kind() == TrackKind::Video {
            self.has_video.store(true, Ordering::SeqCst);
        }
        self.record(EngineCall::AddTrack(track.kind()));
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, EngineError> {
        self.record(EngineCall::CreateOffer);
        Ok(FAKE_OFFER_SDP.to_owned())
    }

    async fn create_answer(&self) -> Result<String, EngineError> {
        self.record(EngineCall::CreateAnswer);
        Ok(FAKE_ANSWER_SDP.to_owned())
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::SetLocal(description));
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError> {
        if self.fail_remote_description {
            return Err(EngineError::Other("malformed remote description".to_owned()));
        }
        self.record(EngineCall::SetRemote(description));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.record(EngineCall::AddCandidate(candidate));
        Ok(())
    }

    async fn encoder_parameters(&self) -> Result<EncoderParameters, EngineError> {
        if !self.has_video.load(Ordering::SeqCst) {
            return Err(EngineError::NoVideoSender);
        }
        Ok(EncoderParameters::default())
    }

    async fn set_encoder_parameters(
        &self,
        parameters: EncoderParameters,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::SetEncoder(parameters));
        Ok(())
    }

    async fn stats(&self) -> Result<Vec<StatsEntry>, EngineError> {
        // 250 000 bytes more on every poll
        let bytes = self.bytes.fetch_add(250_000, Ordering::SeqCst) + 250_000;
        Ok(vec![
            StatsEntry::InboundVideo(VideoRtpStats {
                frame_width: Some(2560),
                frame_height: Some(1440),
                frames_per_second: Some(60.0),
                bytes,
                packets_lost: Some(0),
                jitter_seconds: None,
            }),
            StatsEntry::OutboundVideo(VideoRtpStats {
                frame_width: Some(2560),
                frame_height: Some(1440),
                frames_per_second: Some(60.0),
                bytes,
                ..Default::default()
            }),
            StatsEntry::Codec {
                mime_type: "video/VP8".to_owned(),
            },
        ])
    }

    fn state(&self) -> ConnectionState {
        if self.is_closed() {
            ConnectionState::Closed
        } else {
            ConnectionState::Connected
        }
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.closed.store(true, Ordering::SeqCst);
        self.record(EngineCall::Close);
        Ok(())
    }
}

/// PeerEngine that hands out recording connections.
#[derive(Clone, Default)]
pub struct FakeEngine {
    connections: Arc<Mutex<Vec<Arc<FakeConnection>>>>,
    fail_remote_description: Arc<AtomicBool>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later connection rejects remote descriptions.
    pub fn fail_remote_descriptions(&self) {
        self.fail_remote_description.store(true, Ordering::SeqCst);
    }

    pub fn connections(&self) -> Vec<Arc<FakeConnection>> {
        self.connections.lock().unwrap().clone()
    }

    /// Newest connection created for `remote`.
    pub fn connection_for(&self, remote: &PeerId) -> Option<Arc<FakeConnection>> {
        self.connections()
            .into_iter()
            .rev()
            .find(|connection| &connection.remote == remote)
    }
}

#[async_trait]
impl PeerEngine for FakeEngine {
    async fn create_connection(
        &self,
        id: ConnectionId,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerConnection>, EngineError> {
        let connection = Arc::new(FakeConnection {
            id,
            remote: id.remote,
            calls: Mutex::new(Vec::new()),
            events,
            closed: AtomicBool::new(false),
            has_video: AtomicBool::new(false),
            fail_remote_description: self.fail_remote_description.load(Ordering::SeqCst),
            bytes: AtomicU64::new(0),
        });

        self.connections.lock().unwrap().push(connection.clone());
        Ok(connection)
    }
}
