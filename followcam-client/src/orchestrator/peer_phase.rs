use std::fmt;

/// Стадия согласования соединения с одним удаленным пиром.
/// Закрытое соединение слота не имеет.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerPhase {
    New,
    OfferSent,
    AnswerSent,
    RemoteDescriptionSet,
    Connected,
    Failed,
}

impl fmt::Display for PeerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerPhase::New => "new",
            PeerPhase::OfferSent => "offer-sent",
            PeerPhase::AnswerSent => "answer-sent",
            PeerPhase::RemoteDescriptionSet => "remote-description-set",
            PeerPhase::Connected => "connected",
            PeerPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
