use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// Internal imports
use crate::capture::TrackSet;
use crate::config::ClientConfig;
use crate::engine::{ConnectionState, EngineEvent, PeerEngine, RtcConfig, RtcEngine};
use crate::error::{
    CONNECTION_FAILED_MESSAGE, ClientError, SIGNALING_FAILED_MESSAGE, TransportError,
};
use crate::orchestrator::{ConnectionOrchestrator, Deferred, PeerNotice};
use crate::session::client_event::{ClientEvent, SessionState};
use crate::session::outbox::OutboxSignaling;
use crate::session::session_command::SessionCommand;
use crate::stats::StatsSampler;
use crate::transport::{RelayConnector, RelayLink, WsConnector};
use followcam_core::{PeerId, Role, SdpType, SignalMessage, StreamId};

/// Управление сессией из приложения. Клонируется свободно.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    state_rx: watch::Receiver<SessionState>,
    peer_id_rx: watch::Receiver<Option<PeerId>>,
}

impl SessionHandle {
    pub fn open(&self, stream_id: StreamId, role: Role) -> Result<(), ClientError> {
        self.send(SessionCommand::Open { stream_id, role })
    }

    pub fn close(&self) -> Result<(), ClientError> {
        self.send(SessionCommand::Close)
    }

    pub fn attach_local_media(&self, tracks: TrackSet) -> Result<(), ClientError> {
        self.send(SessionCommand::AttachMedia(tracks))
    }

    pub fn shutdown(&self) -> Result<(), ClientError> {
        self.send(SessionCommand::Shutdown)
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Последний PeerId, назначенный релеем.
    pub fn local_peer_id(&self) -> Option<PeerId> {
        *self.peer_id_rx.borrow()
    }

    fn send(&self, command: SessionCommand) -> Result<(), ClientError> {
        self.command_tx
            .send(command)
            .map_err(|_| ClientError::SessionClosed)
    }
}

struct StatsPoller {
    sampler: StatsSampler,
    interval: Interval,
}

/// Актор клиентской сессии: транспорт до релея, роль и stream id,
/// переподключение и разбор входящих сообщений для оркестратора.
pub struct SignalingSession {
    config: ClientConfig,

    connector: Arc<dyn RelayConnector>,

    orchestrator: ConnectionOrchestrator,

    /// Канал для приема команд от приложения.
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,

    /// События для приложения.
    event_tx: mpsc::UnboundedSender<ClientEvent>,

    state_tx: watch::Sender<SessionState>,
    peer_id_tx: watch::Sender<Option<PeerId>>,

    /// Исходящие сообщения оркестратора.
    outbox_rx: mpsc::UnboundedReceiver<SignalMessage>,

    /// События от всех peer-connection.
    engine_rx: mpsc::Receiver<EngineEvent>,

    deferred_rx: mpsc::UnboundedReceiver<Deferred>,

    /// Текущее соединение с релеем.
    link: Option<RelayLink>,

    /// Stream id и роль, под которыми сессия открыта. None после close().
    target: Option<(StreamId, Role)>,

    /// PeerId текущего соединения с релеем.
    local_peer_id: Option<PeerId>,

    /// Когда переподключиться к релею.
    reconnect_at: Option<Instant>,

    stats: Option<StatsPoller>,

    /// Эпоха соединения, для которого запускался опрос статистики.
    stats_epoch: Option<u64>,
}

impl SignalingSession {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn RelayConnector>,
        engine: Arc<dyn PeerEngine>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
        let (peer_id_tx, peer_id_rx) = watch::channel(None);

        let signaling = Arc::new(OutboxSignaling::new(outbox_tx));
        let (orchestrator, channels) = ConnectionOrchestrator::new(engine, signaling, &config);

        let session = Self {
            config,
            connector,
            orchestrator,
            command_rx,
            event_tx,
            state_tx,
            peer_id_tx,
            outbox_rx,
            engine_rx: channels.engine_rx,
            deferred_rx: channels.deferred_rx,
            link: None,
            target: None,
            local_peer_id: None,
            reconnect_at: None,
            stats: None,
            stats_epoch: None,
        };

        let handle = SessionHandle {
            command_tx,
            state_rx,
            peer_id_rx,
        };

        (session, handle, event_rx)
    }

    /// Сессия с WebSocket транспортом и движком webrtc-rs.
    pub fn from_config(
        config: ClientConfig,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let connector = Arc::new(WsConnector::new(config.relay_url.clone()));
        let engine = Arc::new(RtcEngine::new(RtcConfig::from(&config)));
        Self::new(config, connector, engine)
    }

    /// Запуск главного цикла сессии.
    /// Должен быть запущен через tokio::spawn.
    pub async fn run(mut self) {
        info!("Signaling session started");

        loop {
            tokio::select! {
                // 1. Команды приложения
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) | None => {
                            self.teardown().await;
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                // 2. Сообщения от релея
                frame = recv_or_pending(&mut self.link) => {
                    match frame {
                        Some(text) => self.handle_frame(&text).await,
                        None => self.on_transport_closed(),
                    }
                }

                // 3. Исходящие сообщения оркестратора
                Some(message) = self.outbox_rx.recv() => self.forward(message),

                // 4. События движка
                Some(event) = self.engine_rx.recv() => self.handle_engine_event(event).await,

                // 5. Отложенные действия оркестратора
                Some(deferred) = self.deferred_rx.recv() => self.orchestrator.on_deferred(deferred).await,

                // 6. Переподключение к релею
                _ = sleep_until_or_pending(self.reconnect_at) => {
                    self.reconnect_at = None;
                    info!("Reconnecting to relay");
                    self.connect().await;
                }

                // 7. Опрос статистики
                _ = tick_or_pending(&mut self.stats) => self.poll_stats().await,
            }
        }

        info!("Signaling session finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Open { stream_id, role } => self.open(stream_id, role).await,

            SessionCommand::Close => {
                info!("Closing session");
                self.teardown().await;
            }

            SessionCommand::AttachMedia(tracks) => {
                info!("Attached {} local tracks", tracks.len());
                for previous in self.orchestrator.take_local_tracks() {
                    if !tracks.iter().any(|track| Arc::ptr_eq(track, &previous)) {
                        previous.stop();
                    }
                }
                self.orchestrator.set_local_tracks(tracks);
            }

            // Обрабатывается в run()
            SessionCommand::Shutdown => {}
        }
    }

    async fn open(&mut self, stream_id: StreamId, role: Role) {
        // Старое соединение закрывается без переподключения
        self.reconnect_at = None;
        if self.link.take().is_some() {
            info!("Dropping previous relay connection");
        }
        self.orchestrator.close_all().await;
        self.stop_stats();

        info!("Opening stream {} as {}", stream_id, role);
        self.orchestrator.set_stream(Some(stream_id.clone()));
        self.target = Some((stream_id, role));

        self.connect().await;
    }

    async fn connect(&mut self) {
        let Some((stream_id, role)) = self.target.clone() else {
            return;
        };

        self.local_peer_id = None;
        self.set_state(SessionState::Connecting);

        // Зависшее подключение не должно держать цикл дольше таймаута
        let timeout = self.config.connect_timeout;
        let attempt = tokio::time::timeout(timeout, self.connector.connect())
            .await
            .unwrap_or(Err(TransportError::Timeout(timeout)));

        match attempt {
            Ok(link) => {
                self.link = Some(link);
                self.set_state(SessionState::Connected);

                // Отправитель объявляет стрим, зритель просит offer
                self.forward(SignalMessage::directory_request(role, stream_id));
            }
            Err(e) => {
                error!("Failed to reach relay: {}", e);
                self.emit(ClientEvent::Error(SIGNALING_FAILED_MESSAGE.to_owned()));
                self.set_state(SessionState::Failed);
                self.schedule_reconnect();
            }
        }
    }

    fn on_transport_closed(&mut self) {
        warn!("Relay connection closed");
        self.link = None;
        self.local_peer_id = None;
        self.set_state(SessionState::Disconnected);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.target.is_none() {
            return;
        }
        let delay = self.config.reconnect_delay;
        info!("Reconnecting in {:?}", delay);
        self.reconnect_at = Some(Instant::now() + delay);
    }

    async fn handle_frame(&mut self, text: &str) {
        let message = match SignalMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Bad signaling message: {}", e);
                return;
            }
        };

        self.dispatch(message).await;
        self.sync_stats();
    }

    async fn dispatch(&mut self, message: SignalMessage) {
        let Some(role) = self.role() else {
            return;
        };

        match message {
            SignalMessage::UuidAssign { peer_id } => {
                if let Some(current) = self.local_peer_id {
                    warn!("Already assigned {}, ignoring {}", current, peer_id);
                    return;
                }
                info!("Relay assigned id {}", peer_id);
                self.local_peer_id = Some(peer_id);
                self.peer_id_tx.send_replace(Some(peer_id));
                self.emit(ClientEvent::PeerIdAssigned(peer_id));
            }

            SignalMessage::OfferRequest {
                peer_id: Some(viewer),
                ..
            } if role == Role::Sender => {
                self.orchestrator.on_offer_requested(viewer).await;
            }

            SignalMessage::Description {
                peer_id: Some(remote),
                description,
                ..
            } => match (description.sdp_type, role) {
                (SdpType::Offer, Role::Viewer) => self.orchestrator.on_offer(remote, description).await,
                (SdpType::Answer, Role::Sender) => {
                    self.orchestrator.on_answer(remote, description).await
                }
                (sdp_type, role) => debug!("Ignoring {:?} from {} as {}", sdp_type, remote, role),
            },

            SignalMessage::Candidate {
                peer_id: Some(remote),
                candidate,
                ..
            } => self.orchestrator.on_candidate(remote, candidate).await,

            SignalMessage::Candidates {
                peer_id: Some(remote),
                candidates,
                ..
            } => {
                for candidate in candidates {
                    self.orchestrator.on_candidate(remote, candidate).await;
                }
            }

            other => debug!("Unhandled signaling message as {}: {:?}", role, other),
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        let Some(notice) = self.orchestrator.on_engine_event(event).await else {
            return;
        };

        match notice {
            PeerNotice::Streaming(_) => self.set_state(SessionState::Streaming),
            PeerNotice::Failed(_) => {
                self.emit(ClientEvent::Error(CONNECTION_FAILED_MESSAGE.to_owned()));
                self.set_state(SessionState::Failed);
            }
            PeerNotice::Disconnected(_) => self.set_state(SessionState::Disconnected),
            PeerNotice::RemoteTrack(peer_id, kind) => {
                self.emit(ClientEvent::RemoteTrack { peer_id, kind })
            }
        }
    }

    /// Отправить сообщение в текущее соединение с релеем.
    fn forward(&self, message: SignalMessage) {
        let Some(link) = &self.link else {
            debug!("Relay link is down, dropping {:?}", message);
            return;
        };

        match message.to_json() {
            Ok(text) => {
                if let Err(e) = link.send(text) {
                    debug!("Failed to queue signal: {}", e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }

    /// Опрос начинается заново, когда активным становится новое соединение.
    fn sync_stats(&mut self) {
        let Some(role) = self.role() else {
            return;
        };
        let Some((epoch, _)) = self.orchestrator.active_connection() else {
            self.stats = None;
            return;
        };
        if self.stats_epoch == Some(epoch) {
            return;
        }

        let period = self.config.stats_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Starting stats polling for connection epoch {}", epoch);
        self.stats_epoch = Some(epoch);
        self.stats = Some(StatsPoller {
            sampler: StatsSampler::new(role),
            interval,
        });
    }

    async fn poll_stats(&mut self) {
        let Some((_, connection)) = self.orchestrator.active_connection() else {
            self.stats = None;
            return;
        };
        if connection.state() == ConnectionState::Closed {
            debug!("Active connection closed, stats polling stopped");
            self.stats = None;
            return;
        }

        let entries = match connection.stats().await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Stats poll failed: {}", e);
                return;
            }
        };

        let Some(poller) = self.stats.as_mut() else {
            return;
        };
        let snapshot = poller.sampler.sample(&entries, Instant::now());
        self.emit(ClientEvent::Stats(snapshot));
    }

    fn stop_stats(&mut self) {
        self.stats = None;
        self.stats_epoch = None;
    }

    /// Полное закрытие: после него ни один колбэк не поднимет сессию обратно.
    async fn teardown(&mut self) {
        // 1. Отключаем переподключение до закрытия транспорта
        self.reconnect_at = None;
        self.target = None;

        // 2. Закрываем все peer-connection вместе с буферами кандидатов
        self.orchestrator.close_all().await;

        // 3. Останавливаем локальное медиа
        for track in self.orchestrator.take_local_tracks() {
            track.stop();
        }

        // 4. Таймер статистики
        self.stop_stats();

        // 5. Транспорт
        self.link = None;
        self.local_peer_id = None;
        self.orchestrator.set_stream(None);

        self.set_state(SessionState::Disconnected);
    }

    fn role(&self) -> Option<Role> {
        self.target.as_ref().map(|(_, role)| *role)
    }

    fn set_state(&self, state: SessionState) {
        if *self.state_tx.borrow() == state {
            return;
        }
        debug!("Session state: {}", state);
        self.state_tx.send_replace(state);
        self.emit(ClientEvent::StateChanged(state));
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event);
    }
}

async fn recv_or_pending(link: &mut Option<RelayLink>) -> Option<String> {
    match link {
        Some(link) => link.incoming.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_or_pending(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_or_pending(stats: &mut Option<StatsPoller>) {
    match stats {
        Some(poller) => {
            poller.interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
