use crate::capture::{MediaTrack, TrackKind};
use crate::config::{ClientConfig, DEFAULT_STUN_SERVERS};
use crate::engine::encoder::EncoderParameters;
use crate::engine::engine_event::{ConnectionId, ConnectionState, EngineEvent, IceConnectionState};
use crate::engine::peer_engine::{PeerConnection, PeerEngine};
use crate::engine::stats_entry::StatsEntry;
use crate::error::EngineError;
use async_trait::async_trait;
use followcam_core::{IceCandidate, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const STREAM_LABEL: &str = "followcam";

/// Конфигурация для WebRTC
#[derive(Debug, Clone)]
pub struct RtcConfig {
    pub ice_servers: Vec<String>,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: DEFAULT_STUN_SERVERS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl From<&ClientConfig> for RtcConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            ice_servers: config.ice_servers.clone(),
        }
    }
}

/// `PeerEngine` on top of webrtc-rs.
#[derive(Debug, Clone, Default)]
pub struct RtcEngine {
    config: RtcConfig,
}

impl RtcEngine {
    pub fn new(config: RtcConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerEngine for RtcEngine {
    async fn create_connection(
        &self,
        id: ConnectionId,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerConnection>, EngineError> {
        let connection = RtcConnection::new(id, self.config.clone(), events).await?;
        Ok(Arc::new(connection))
    }
}

pub struct RtcConnection {
    pub id: ConnectionId,
    pub peer_connection: Arc<RTCPeerConnection>,
    video_sender: Mutex<Option<Arc<RTCRtpSender>>>,
}

impl RtcConnection {
    /// Инициализация нового WebRTC соединения.
    /// event_tx: канал, в который соединение отдает события для сессии.
    pub async fn new(
        id: ConnectionId,
        config: RtcConfig,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        // 1. Настройка MediaEngine (VP8/Opus и остальные кодеки по умолчанию)
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        // 2. Регистрация интерцепторов (метрики, RTCP отчеты)
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        // 3. Создание API объекта
        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        // 4. Конфигурация ICE серверов (STUN)
        let ice_servers = if config.ice_servers.is_empty() {
            Vec::new()
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers,
                credential: String::new(),
                username: String::new(),
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        // 5. Создание PeerConnection
        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // A. Состояние ICE (Connected/Failed/Disconnected)
        let state_tx = event_tx.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("ICE state changed for {}: {:?}", id, s);
                    let Some(state) = ice_state(s) else { return };
                    let _ = tx.send(EngineEvent::IceStateChanged(id, state)).await;
                })
            },
        ));

        // B. Trickle ICE: отправка локальных кандидатов удаленному пиру
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(candidate) = serde_json::to_value(&json_candidate)
                    .and_then(serde_json::from_value::<IceCandidate>)
                else {
                    return;
                };
                let _ = tx.send(EngineEvent::LocalCandidate(id, candidate)).await;
            })
        }));

        // C. Входящие треки от удаленного пира
        let track_tx = event_tx;
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Video => TrackKind::Video,
                    RTPCodecType::Audio => TrackKind::Audio,
                    _ => return,
                };
                debug!("Remote {} track from {}", kind, id);
                let _ = tx.send(EngineEvent::RemoteTrack(id, kind)).await;
            })
        }));

        Ok(Self {
            id,
            peer_connection,
            video_sender: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PeerConnection for RtcConnection {
    async fn add_local_track(&self, track: Arc<dyn MediaTrack>) -> Result<(), EngineError> {
        let mime_type = match track.kind() {
            TrackKind::Video => MIME_TYPE_VP8,
            TrackKind::Audio => MIME_TYPE_OPUS,
        };

        // Samples are written by the capture pipeline that owns `track`.
        let local = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            track.id().to_owned(),
            STREAM_LABEL.to_owned(),
        ));

        // Только отправка: offer не ждет встречного медиа
        let transceiver = self
            .peer_connection
            .add_transceiver_from_track(
                local as Arc<dyn TrackLocal + Send + Sync>,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Sendonly,
                    send_encodings: vec![],
                }),
            )
            .await?;

        if track.kind() == TrackKind::Video {
            *self.video_sender.lock().await = Some(transceiver.sender().await);
        }

        Ok(())
    }

    async fn create_offer(&self) -> Result<String, EngineError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, EngineError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(answer.sdp)
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError> {
        self.peer_connection
            .set_local_description(to_rtc_description(description)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError> {
        self.peer_connection
            .set_remote_description(to_rtc_description(description)?)
            .await?;
        Ok(())
    }

    /// Добавить удаленного ICE-кандидата (Trickle ICE)
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        let candidate_json = serde_json::to_string(&candidate)?;
        let candidate: RTCIceCandidateInit = serde_json::from_str(&candidate_json)?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    /// webrtc-rs encodings carry only rid, ssrc and payload type.
    async fn encoder_parameters(&self) -> Result<EncoderParameters, EngineError> {
        let Some(sender) = self.video_sender.lock().await.clone() else {
            return Err(EngineError::NoVideoSender);
        };
        let parameters = sender.get_parameters().await;
        debug!(
            "Video sender for {} has {} encodings",
            self.id,
            parameters.encodings.len()
        );
        Err(EngineError::Unsupported(
            "webrtc-rs senders do not expose bitrate or scaling parameters",
        ))
    }

    async fn set_encoder_parameters(
        &self,
        _parameters: EncoderParameters,
    ) -> Result<(), EngineError> {
        Err(EngineError::Unsupported(
            "webrtc-rs senders do not expose bitrate or scaling parameters",
        ))
    }

    async fn stats(&self) -> Result<Vec<StatsEntry>, EngineError> {
        let report = self.peer_connection.get_stats().await;

        let entries = report
            .reports
            .values()
            .filter_map(|stat| serde_json::to_value(stat).ok())
            .filter_map(|value| StatsEntry::from_report(&value))
            .collect();

        Ok(entries)
    }

    fn state(&self) -> ConnectionState {
        match self.peer_connection.connection_state() {
            RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
            RTCPeerConnectionState::Connected => ConnectionState::Connected,
            RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
            RTCPeerConnectionState::Failed => ConnectionState::Failed,
            RTCPeerConnectionState::Closed => ConnectionState::Closed,
            _ => ConnectionState::New,
        }
    }

    /// Закрыть WebRTC соединение
    async fn close(&self) -> Result<(), EngineError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn to_rtc_description(description: SessionDescription) -> Result<RTCSessionDescription, EngineError> {
    let description = match description.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(description.sdp)?,
    };
    Ok(description)
}

fn ice_state(state: RTCIceConnectionState) -> Option<IceConnectionState> {
    match state {
        RTCIceConnectionState::New => Some(IceConnectionState::New),
        RTCIceConnectionState::Checking => Some(IceConnectionState::Checking),
        RTCIceConnectionState::Connected => Some(IceConnectionState::Connected),
        RTCIceConnectionState::Completed => Some(IceConnectionState::Completed),
        RTCIceConnectionState::Disconnected => Some(IceConnectionState::Disconnected),
        RTCIceConnectionState::Failed => Some(IceConnectionState::Failed),
        RTCIceConnectionState::Closed => Some(IceConnectionState::Closed),
        _ => None,
    }
}
