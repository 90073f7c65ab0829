use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// Internal imports
use crate::buffer::CandidateBuffer;
use crate::capture::{TrackKind, TrackSet, has_video};
use crate::config::ClientConfig;
use crate::engine::{ConnectionId, EngineEvent, IceConnectionState, PeerConnection, PeerEngine};
use crate::error::EngineError;
use crate::orchestrator::outbound_signaling::OutboundSignaling;
use crate::orchestrator::peer_phase::PeerPhase;
use followcam_core::sdp::annotate_video_bandwidth;
use followcam_core::{IceCandidate, PeerId, SessionDescription, StreamId};

const ENGINE_EVENT_BUFFER: usize = 256;

/// Отложенные действия. Возвращаются в цикл сессии по таймеру.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Настроить энкодер видео для соединения с указанной эпохой.
    OptimizeEncoder { peer_id: PeerId, epoch: u64 },
}

/// What an engine event means for the session's visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerNotice {
    Streaming(PeerId),
    Failed(PeerId),
    Disconnected(PeerId),
    RemoteTrack(PeerId, TrackKind),
}

/// Receiving ends the session loop selects over.
pub struct OrchestratorChannels {
    pub engine_rx: mpsc::Receiver<EngineEvent>,
    pub deferred_rx: mpsc::UnboundedReceiver<Deferred>,
}

struct PeerSlot {
    connection: Arc<dyn PeerConnection>,
    phase: PeerPhase,
    remote_committed: bool,
    /// Номер экземпляра соединения. События и отложенные действия
    /// со старой эпохой игнорируются.
    epoch: u64,
}

/// Ведет согласование offer/answer/ICE с каждым удаленным пиром.
/// Принадлежит ровно одной сессии, вызывается только из ее цикла.
pub struct ConnectionOrchestrator {
    /// Фабрика peer-connection.
    engine: Arc<dyn PeerEngine>,

    /// Куда уходят descriptions и кандидаты для удаленных пиров.
    signaling: Arc<dyn OutboundSignaling>,

    /// Клонируется в каждое новое соединение.
    engine_tx: mpsc::Sender<EngineEvent>,

    deferred_tx: mpsc::UnboundedSender<Deferred>,

    target_kbps: u32,
    optimize_delay: Duration,

    stream_id: Option<StreamId>,

    /// Локальные треки отправителя, подключаются к каждому новому соединению.
    local_tracks: TrackSet,

    /// Активные соединения. Храним их здесь, чтобы соединение оставалось живым.
    peers: HashMap<PeerId, PeerSlot>,

    /// Кандидаты, пришедшие до remote description.
    candidates: CandidateBuffer,

    next_epoch: u64,

    /// Последнее созданное соединение, с него снимается статистика.
    active: Option<(PeerId, u64)>,
}

impl ConnectionOrchestrator {
    pub fn new(
        engine: Arc<dyn PeerEngine>,
        signaling: Arc<dyn OutboundSignaling>,
        config: &ClientConfig,
    ) -> (Self, OrchestratorChannels) {
        // Один канал собирает события всех соединений в один поток
        let (engine_tx, engine_rx) = mpsc::channel(ENGINE_EVENT_BUFFER);
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            engine,
            signaling,
            engine_tx,
            deferred_tx,
            target_kbps: config.target_bitrate_kbps,
            optimize_delay: config.encoder_optimize_delay,
            stream_id: None,
            local_tracks: Vec::new(),
            peers: HashMap::new(),
            candidates: CandidateBuffer::new(),
            next_epoch: 0,
            active: None,
        };

        (
            orchestrator,
            OrchestratorChannels {
                engine_rx,
                deferred_rx,
            },
        )
    }

    pub fn set_stream(&mut self, stream_id: Option<StreamId>) {
        self.stream_id = stream_id;
    }

    pub fn set_local_tracks(&mut self, tracks: TrackSet) {
        self.local_tracks = tracks;
    }

    pub fn local_tracks(&self) -> &TrackSet {
        &self.local_tracks
    }

    pub fn take_local_tracks(&mut self) -> TrackSet {
        std::mem::take(&mut self.local_tracks)
    }

    /// Отправитель: зритель ждет offer.
    pub async fn on_offer_requested(&mut self, remote: PeerId) {
        info!("Creating offer for viewer {}", remote);

        // 1. Новое соединение (старое для этого пира закрывается)
        let Some(connection) = self.open_connection(remote).await else {
            return;
        };

        // 2. Треки, offer, SDP с битрейтом, отправка
        if let Err(e) = self.send_offer(remote, &connection).await {
            error!("Offer for {} failed: {}", remote, e);
            self.fail(remote).await;
            return;
        }
        self.set_phase(remote, PeerPhase::OfferSent);

        // 3. Кандидаты применяются только после answer
        self.flush(remote).await;

        // 4. Настройка энкодера, когда sender уже согласован
        if has_video(&self.local_tracks) {
            self.schedule_encoder_optimization(remote);
        }
    }

    /// Зритель: пришел offer от отправителя.
    pub async fn on_offer(&mut self, remote: PeerId, offer: SessionDescription) {
        info!("Received offer from {}", remote);

        let Some(connection) = self.open_connection(remote).await else {
            return;
        };

        if let Err(e) = connection.set_remote_description(offer).await {
            error!("Failed to apply offer from {}: {}", remote, e);
            self.fail(remote).await;
            return;
        }
        self.mark_remote_committed(remote);

        if let Err(e) = self.send_answer(remote, &connection).await {
            error!("Answer for {} failed: {}", remote, e);
            self.fail(remote).await;
            return;
        }
        self.set_phase(remote, PeerPhase::AnswerSent);

        self.flush(remote).await;
    }

    /// Отправитель: зритель ответил на offer.
    pub async fn on_answer(&mut self, remote: PeerId, answer: SessionDescription) {
        let Some(slot) = self.peers.get(&remote) else {
            debug!("Answer from {} without a pending offer, ignoring", remote);
            return;
        };
        if slot.phase == PeerPhase::Failed {
            warn!("Answer from {} for a {} connection, ignoring", remote, slot.phase);
            return;
        }
        let connection = slot.connection.clone();

        info!("Received answer from {}", remote);
        if let Err(e) = connection.set_remote_description(answer).await {
            error!("Failed to apply answer from {}: {}", remote, e);
            self.fail(remote).await;
            return;
        }
        self.mark_remote_committed(remote);

        self.flush(remote).await;
    }

    /// Удаленный кандидат: применяем сразу или откладываем до remote description.
    pub async fn on_candidate(&mut self, remote: PeerId, candidate: IceCandidate) {
        match self.peers.get(&remote) {
            Some(slot) if slot.phase == PeerPhase::Failed => {
                debug!("Dropping candidate for {} connection to {}", slot.phase, remote);
            }
            Some(slot) if slot.remote_committed => {
                let connection = slot.connection.clone();
                apply_candidate(remote, connection.as_ref(), candidate).await;
            }
            _ => {
                self.candidates.push(remote, candidate);
                debug!(
                    "Buffered candidate for {} ({} pending)",
                    remote,
                    self.candidates.len(&remote)
                );
            }
        }
    }

    /// Применить отложенные кандидаты в порядке поступления.
    /// Ничего не делает, пока remote description не применен.
    pub async fn flush(&mut self, remote: PeerId) {
        let Some(slot) = self.peers.get(&remote) else {
            return;
        };
        if !slot.remote_committed {
            return;
        }
        let connection = slot.connection.clone();

        let pending = self.candidates.drain(&remote);
        if pending.is_empty() {
            return;
        }

        debug!("Applying {} buffered candidates for {}", pending.len(), remote);
        for candidate in pending {
            apply_candidate(remote, connection.as_ref(), candidate).await;
        }
    }

    /// Обработка событий от движка.
    /// События от замененных или закрытых соединений отбрасываются.
    pub async fn on_engine_event(&mut self, event: EngineEvent) -> Option<PeerNotice> {
        let id = event.connection_id();
        if !self.is_current(id) {
            debug!("Ignoring event from stale connection {}", id);
            return None;
        }
        let remote = id.remote;

        match event {
            EngineEvent::LocalCandidate(_, candidate) => {
                // Движок нашел локальный путь, отправляем его пиру через релей
                self.signaling
                    .send_candidate(remote, self.stream_id.clone(), candidate)
                    .await;
                None
            }

            EngineEvent::IceStateChanged(_, state) => {
                let slot = self.peers.get_mut(&remote)?;

                match state {
                    IceConnectionState::Connected | IceConnectionState::Completed => {
                        info!("ICE {:?} with {}", state, remote);
                        slot.phase = PeerPhase::Connected;
                        Some(PeerNotice::Streaming(remote))
                    }
                    IceConnectionState::Failed => {
                        error!("ICE failed with {}", remote);
                        slot.phase = PeerPhase::Failed;
                        Some(PeerNotice::Failed(remote))
                    }
                    IceConnectionState::Disconnected => {
                        warn!("ICE disconnected from {}", remote);
                        Some(PeerNotice::Disconnected(remote))
                    }
                    IceConnectionState::Closed => {
                        info!("Connection {} closed, forgetting peer", id);
                        self.close_peer(remote).await;
                        None
                    }
                    IceConnectionState::New | IceConnectionState::Checking => None,
                }
            }

            EngineEvent::RemoteTrack(_, kind) => {
                info!("Received remote {} track from {}", kind, remote);
                Some(PeerNotice::RemoteTrack(remote, kind))
            }
        }
    }

    pub async fn on_deferred(&mut self, deferred: Deferred) {
        match deferred {
            Deferred::OptimizeEncoder { peer_id, epoch } => {
                self.optimize_encoder(peer_id, epoch).await;
            }
        }
    }

    /// Максимальный битрейт, без даунскейла, приоритет разрешения.
    pub async fn optimize_encoder(&mut self, peer_id: PeerId, epoch: u64) {
        let Some(slot) = self.peers.get(&peer_id).filter(|slot| slot.epoch == epoch) else {
            debug!("Skipping encoder update for stale connection to {}", peer_id);
            return;
        };
        let connection = slot.connection.clone();
        let target_kbps = self.target_kbps;

        let result = async {
            let mut parameters = connection.encoder_parameters().await?;
            parameters.optimize_for(target_kbps);
            connection.set_encoder_parameters(parameters).await
        }
        .await;

        match result {
            Ok(()) => info!("Encoder for {} set to {} kbps", peer_id, target_kbps),
            Err(e) => warn!("Could not update encoder for {}: {}", peer_id, e),
        }
    }

    /// Закрыть соединение с пиром и забыть его кандидаты.
    pub async fn close_peer(&mut self, remote: PeerId) {
        self.candidates.remove(&remote);
        if self.active.is_some_and(|(peer_id, _)| peer_id == remote) {
            self.active = None;
        }

        let Some(slot) = self.peers.remove(&remote) else {
            return;
        };
        close_connection(remote, slot.connection.as_ref()).await;
    }

    pub async fn close_all(&mut self) {
        for (remote, slot) in self.peers.drain() {
            close_connection(remote, slot.connection.as_ref()).await;
        }
        self.candidates.clear();
        self.active = None;
    }

    pub fn phase(&self, remote: &PeerId) -> Option<PeerPhase> {
        self.peers.get(remote).map(|slot| slot.phase)
    }

    pub fn buffered(&self, remote: &PeerId) -> usize {
        self.candidates.len(remote)
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn connection(&self, remote: &PeerId) -> Option<Arc<dyn PeerConnection>> {
        self.peers.get(remote).map(|slot| slot.connection.clone())
    }

    /// Эпоха и соединение, с которого сейчас снимается статистика.
    pub fn active_connection(&self) -> Option<(u64, Arc<dyn PeerConnection>)> {
        let (remote, epoch) = self.active?;
        let slot = self.peers.get(&remote).filter(|slot| slot.epoch == epoch)?;
        Some((epoch, slot.connection.clone()))
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        self.peers
            .get(&id.remote)
            .is_some_and(|slot| slot.epoch == id.epoch)
    }

    async fn open_connection(&mut self, remote: PeerId) -> Option<Arc<dyn PeerConnection>> {
        // 1. Если соединение уже есть (повторный запрос), закрываем старое
        if let Some(previous) = self.peers.remove(&remote) {
            debug!("Replacing connection to {}", remote);
            close_connection(remote, previous.connection.as_ref()).await;
        }
        if self.active.is_some_and(|(peer_id, _)| peer_id == remote) {
            self.active = None;
        }

        // 2. Новая эпоха: события старого соединения больше не совпадут
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let id = ConnectionId::new(remote, epoch);

        let connection = match self
            .engine
            .create_connection(id, self.engine_tx.clone())
            .await
        {
            Ok(connection) => connection,
            Err(e) => {
                error!("Failed to create peer connection for {}: {}", remote, e);
                return None;
            }
        };

        // 3. Слот и активное соединение для статистики
        self.peers.insert(
            remote,
            PeerSlot {
                connection: connection.clone(),
                phase: PeerPhase::New,
                remote_committed: false,
                epoch,
            },
        );
        self.active = Some((remote, epoch));

        Some(connection)
    }

    async fn send_offer(
        &self,
        remote: PeerId,
        connection: &Arc<dyn PeerConnection>,
    ) -> Result<(), EngineError> {
        for track in &self.local_tracks {
            connection.add_local_track(track.clone()).await?;
        }

        let offer = connection.create_offer().await?;
        let description =
            SessionDescription::offer(annotate_video_bandwidth(&offer, self.target_kbps));
        connection.set_local_description(description.clone()).await?;

        self.signaling
            .send_description(remote, self.stream_id.clone(), description)
            .await;
        Ok(())
    }

    async fn send_answer(
        &self,
        remote: PeerId,
        connection: &Arc<dyn PeerConnection>,
    ) -> Result<(), EngineError> {
        let answer = connection.create_answer().await?;
        let description =
            SessionDescription::answer(annotate_video_bandwidth(&answer, self.target_kbps));
        connection.set_local_description(description.clone()).await?;

        self.signaling
            .send_description(remote, self.stream_id.clone(), description)
            .await;
        Ok(())
    }

    fn schedule_encoder_optimization(&self, remote: PeerId) {
        let Some(slot) = self.peers.get(&remote) else {
            return;
        };
        let deferred = Deferred::OptimizeEncoder {
            peer_id: remote,
            epoch: slot.epoch,
        };
        let deferred_tx = self.deferred_tx.clone();
        let delay = self.optimize_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = deferred_tx.send(deferred);
        });
    }

    /// Попытка согласования с пиром провалилась: соединение закрывается,
    /// слот остается в фазе Failed до следующего запроса.
    async fn fail(&mut self, remote: PeerId) {
        self.candidates.remove(&remote);
        let Some(slot) = self.peers.get_mut(&remote) else {
            return;
        };
        slot.phase = PeerPhase::Failed;
        let connection = slot.connection.clone();
        close_connection(remote, connection.as_ref()).await;
    }

    fn mark_remote_committed(&mut self, remote: PeerId) {
        if let Some(slot) = self.peers.get_mut(&remote) {
            slot.remote_committed = true;
            slot.phase = PeerPhase::RemoteDescriptionSet;
        }
    }

    fn set_phase(&mut self, remote: PeerId, phase: PeerPhase) {
        if let Some(slot) = self.peers.get_mut(&remote) {
            slot.phase = phase;
        }
    }
}

async fn apply_candidate(remote: PeerId, connection: &dyn PeerConnection, candidate: IceCandidate) {
    if let Err(e) = connection.add_ice_candidate(candidate).await {
        warn!("Failed to add ICE candidate for {}: {}", remote, e);
    }
}

async fn close_connection(remote: PeerId, connection: &dyn PeerConnection) {
    if let Err(e) = connection.close().await {
        warn!("Failed to close connection to {}: {}", remote, e);
    }
}
