use followcam_core::{PeerId, Role, SignalMessage, StreamId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Сообщение, которое нужно доставить конкретному пользователю.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: PeerId,
    pub message: SignalMessage,
}

impl Delivery {
    pub fn new(to: PeerId, message: SignalMessage) -> Self {
        Self { to, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub peer_id: PeerId,
    pub stream_id: Option<StreamId>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEntry {
    pub sender: Option<PeerId>,
    pub waiting_viewers: HashSet<PeerId>,
}

impl StreamEntry {
    fn is_empty(&self) -> bool {
        self.sender.is_none() && self.waiting_viewers.is_empty()
    }
}

/// Directory of live connections and the streams they joined.
///
/// Every operation returns the deliveries it produced; the caller pushes them
/// to the sockets. A peer sits in at most one stream entry at a time.
#[derive(Debug, Default)]
pub struct StreamDirectory {
    peers: HashMap<PeerId, PeerRecord>,
    streams: HashMap<StreamId, StreamEntry>,
}

impl StreamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self) -> PeerId {
        let peer_id = PeerId::new();
        self.peers.insert(
            peer_id,
            PeerRecord {
                peer_id,
                stream_id: None,
                role: None,
            },
        );
        peer_id
    }

    pub fn handle(&mut self, from: PeerId, message: SignalMessage) -> Vec<Delivery> {
        match message {
            SignalMessage::Seed { stream_id } => self.seed(from, stream_id),
            SignalMessage::OfferRequest {
                stream_id: Some(stream_id),
                ..
            } => self.request_offer(from, stream_id),
            other if other.peer_id().is_some() => self.relay(from, other).into_iter().collect(),
            other => {
                warn!("Unhandled message from {}: {:?}", from, other);
                Vec::new()
            }
        }
    }

    pub fn seed(&mut self, from: PeerId, stream_id: StreamId) -> Vec<Delivery> {
        if !self.peers.contains_key(&from) {
            warn!("Seed from unknown peer {}", from);
            return Vec::new();
        }

        self.detach(from);

        let entry = self.streams.entry(stream_id.clone()).or_default();
        let displaced = entry.sender.replace(from).filter(|previous| *previous != from);
        entry.waiting_viewers.remove(&from);

        let deliveries: Vec<Delivery> = entry
            .waiting_viewers
            .iter()
            .map(|viewer| Delivery::new(from, SignalMessage::offer_prompt(*viewer)))
            .collect();

        if let Some(previous) = displaced {
            warn!(
                "Sender {} replaced {} on stream {}",
                from, previous, stream_id
            );
            if let Some(record) = self.peers.get_mut(&previous) {
                record.stream_id = None;
                record.role = None;
            }
        }

        if let Some(record) = self.peers.get_mut(&from) {
            record.stream_id = Some(stream_id.clone());
            record.role = Some(Role::Sender);
        }

        info!(
            "Sender {} seeded stream {} ({} viewers waiting)",
            from,
            stream_id,
            deliveries.len()
        );

        deliveries
    }

    pub fn request_offer(&mut self, from: PeerId, stream_id: StreamId) -> Vec<Delivery> {
        let Some(record) = self.peers.get(&from) else {
            warn!("Offer request from unknown peer {}", from);
            return Vec::new();
        };

        let already_viewing =
            record.role == Some(Role::Viewer) && record.stream_id.as_ref() == Some(&stream_id);
        if !already_viewing {
            self.detach(from);
        }

        let entry = self.streams.entry(stream_id.clone()).or_default();
        entry.waiting_viewers.insert(from);
        let sender = entry.sender;

        if let Some(record) = self.peers.get_mut(&from) {
            record.stream_id = Some(stream_id.clone());
            record.role = Some(Role::Viewer);
        }

        match sender {
            Some(sender) => {
                info!(
                    "Viewer {} requests stream {}, prompting sender {}",
                    from, stream_id, sender
                );
                vec![Delivery::new(sender, SignalMessage::offer_prompt(from))]
            }
            None => {
                info!("Viewer {} queued for stream {}", from, stream_id);
                Vec::new()
            }
        }
    }

    pub fn relay(&self, from: PeerId, message: SignalMessage) -> Option<Delivery> {
        if !self.peers.contains_key(&from) {
            warn!("Relay from unknown peer {}", from);
            return None;
        }

        let target = message.peer_id()?;
        if !self.peers.contains_key(&target) {
            warn!("Relay target {} not found (from {})", target, from);
            return None;
        }

        debug!("Relaying {} -> {}", from, target);
        Some(Delivery::new(target, message.relayed_from(from)))
    }

    pub fn disconnect(&mut self, peer_id: PeerId) {
        self.detach(peer_id);
        if self.peers.remove(&peer_id).is_some() {
            info!("Peer {} left ({} connected)", peer_id, self.peers.len());
        }
    }

    pub fn peer(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    pub fn stream(&self, stream_id: &StreamId) -> Option<&StreamEntry> {
        self.streams.get(stream_id)
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Removes the peer from whatever stream entry it currently occupies.
    fn detach(&mut self, peer_id: PeerId) {
        let Some(stream_id) = self
            .peers
            .get_mut(&peer_id)
            .and_then(|record| record.stream_id.take())
        else {
            return;
        };

        let Some(entry) = self.streams.get_mut(&stream_id) else {
            return;
        };

        if entry.sender == Some(peer_id) {
            entry.sender = None;
        }
        entry.waiting_viewers.remove(&peer_id);

        if entry.is_empty() {
            self.streams.remove(&stream_id);
            debug!("Stream {} dropped", stream_id);
        }
    }
}
