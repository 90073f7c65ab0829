use followcam_core::{IceCandidate, PeerId};
use std::collections::{HashMap, VecDeque};

/// Remote candidates that arrived before the remote description was applied.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    queues: HashMap<PeerId, VecDeque<IceCandidate>>,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, peer_id: PeerId, candidate: IceCandidate) {
        self.queues.entry(peer_id).or_default().push_back(candidate);
    }

    /// Empties the queue for `peer_id`, oldest first.
    pub fn drain(&mut self, peer_id: &PeerId) -> Vec<IceCandidate> {
        self.queues
            .remove(peer_id)
            .map(Vec::from)
            .unwrap_or_default()
    }

    pub fn len(&self, peer_id: &PeerId) -> usize {
        self.queues.get(peer_id).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }

    pub fn remove(&mut self, peer_id: &PeerId) {
        self.queues.remove(peer_id);
    }

    pub fn clear(&mut self) {
        self.queues.clear();
    }
}
