use crate::model::peer::PeerId;
use crate::model::role::Role;
use crate::model::stream::StreamId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const REQUEST_SEED: &str = "seed";
const REQUEST_OFFER: &str = "offerSDP";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{0}' request is missing streamID")]
    MissingStreamId(&'static str),

    #[error("unknown request '{0}'")]
    UnknownRequest(String),

    #[error("message does not match any signaling shape")]
    Unrecognized,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// ICE-кандидат в том виде, в котором его сериализует браузер (`toJSON()`).
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Сообщения сигнального протокола.
///
/// `peer_id` у пересылаемых сообщений означает адресата, когда сообщение
/// идет к релею, и отправителя, когда релей доставляет его дальше.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum SignalMessage {
    UuidAssign {
        peer_id: PeerId,
    },
    Seed {
        stream_id: StreamId,
    },
    OfferRequest {
        peer_id: Option<PeerId>,
        stream_id: Option<StreamId>,
    },
    Description {
        peer_id: Option<PeerId>,
        stream_id: Option<StreamId>,
        description: SessionDescription,
    },
    Candidate {
        peer_id: Option<PeerId>,
        stream_id: Option<StreamId>,
        candidate: IceCandidate,
    },
    Candidates {
        peer_id: Option<PeerId>,
        stream_id: Option<StreamId>,
        candidates: Vec<IceCandidate>,
    },
}

impl SignalMessage {
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::try_from(envelope)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The first message a client sends once its relay transport is open.
    pub fn directory_request(role: Role, stream_id: StreamId) -> Self {
        match role {
            Role::Sender => SignalMessage::Seed { stream_id },
            Role::Viewer => SignalMessage::OfferRequest {
                peer_id: None,
                stream_id: Some(stream_id),
            },
        }
    }

    /// Prompt delivered to a sender on behalf of a waiting viewer.
    pub fn offer_prompt(viewer: PeerId) -> Self {
        SignalMessage::OfferRequest {
            peer_id: Some(viewer),
            stream_id: None,
        }
    }

    pub fn description(
        to: PeerId,
        stream_id: Option<StreamId>,
        description: SessionDescription,
    ) -> Self {
        SignalMessage::Description {
            peer_id: Some(to),
            stream_id,
            description,
        }
    }

    pub fn candidate(to: PeerId, stream_id: Option<StreamId>, candidate: IceCandidate) -> Self {
        SignalMessage::Candidate {
            peer_id: Some(to),
            stream_id,
            candidate,
        }
    }

    pub fn peer_id(&self) -> Option<PeerId> {
        match self {
            SignalMessage::UuidAssign { peer_id } => Some(*peer_id),
            SignalMessage::Seed { .. } => None,
            SignalMessage::OfferRequest { peer_id, .. }
            | SignalMessage::Description { peer_id, .. }
            | SignalMessage::Candidate { peer_id, .. }
            | SignalMessage::Candidates { peer_id, .. } => *peer_id,
        }
    }

    pub fn stream_id(&self) -> Option<&StreamId> {
        match self {
            SignalMessage::UuidAssign { .. } => None,
            SignalMessage::Seed { stream_id } => Some(stream_id),
            SignalMessage::OfferRequest { stream_id, .. }
            | SignalMessage::Description { stream_id, .. }
            | SignalMessage::Candidate { stream_id, .. }
            | SignalMessage::Candidates { stream_id, .. } => stream_id.as_ref(),
        }
    }

    /// Rewrites the message for delivery: the peer id becomes the origin
    /// and the stream id is dropped. Everything else passes through untouched.
    pub fn relayed_from(self, from: PeerId) -> Self {
        match self {
            SignalMessage::UuidAssign { .. } => SignalMessage::UuidAssign { peer_id: from },
            SignalMessage::Seed { .. } => self,
            SignalMessage::OfferRequest { .. } => SignalMessage::OfferRequest {
                peer_id: Some(from),
                stream_id: None,
            },
            SignalMessage::Description { description, .. } => SignalMessage::Description {
                peer_id: Some(from),
                stream_id: None,
                description,
            },
            SignalMessage::Candidate { candidate, .. } => SignalMessage::Candidate {
                peer_id: Some(from),
                stream_id: None,
                candidate,
            },
            SignalMessage::Candidates { candidates, .. } => SignalMessage::Candidates {
                peer_id: Some(from),
                stream_id: None,
                candidates,
            },
        }
    }
}

/// Flat JSON object as it travels over the socket. Unknown keys are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    uuid: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request: Option<String>,
    #[serde(rename = "streamID", default, skip_serializing_if = "Option::is_none")]
    stream_id: Option<StreamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<SessionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    candidate: Option<IceCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<IceCandidate>>,
}

impl TryFrom<Envelope> for SignalMessage {
    type Error = CodecError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope {
            uuid,
            request,
            stream_id,
            description,
            candidate,
            candidates,
        } = envelope;

        if let Some(request) = request {
            return match request.as_str() {
                REQUEST_SEED => Ok(SignalMessage::Seed {
                    stream_id: stream_id.ok_or(CodecError::MissingStreamId(REQUEST_SEED))?,
                }),
                REQUEST_OFFER => Ok(SignalMessage::OfferRequest {
                    peer_id: uuid,
                    stream_id,
                }),
                _ => Err(CodecError::UnknownRequest(request)),
            };
        }

        if let Some(description) = description {
            return Ok(SignalMessage::Description {
                peer_id: uuid,
                stream_id,
                description,
            });
        }

        if let Some(candidate) = candidate {
            return Ok(SignalMessage::Candidate {
                peer_id: uuid,
                stream_id,
                candidate,
            });
        }

        if let Some(candidates) = candidates {
            return Ok(SignalMessage::Candidates {
                peer_id: uuid,
                stream_id,
                candidates,
            });
        }

        match uuid {
            Some(peer_id) => Ok(SignalMessage::UuidAssign { peer_id }),
            None => Err(CodecError::Unrecognized),
        }
    }
}

impl From<SignalMessage> for Envelope {
    fn from(message: SignalMessage) -> Self {
        match message {
            SignalMessage::UuidAssign { peer_id } => Envelope {
                uuid: Some(peer_id),
                ..Default::default()
            },
            SignalMessage::Seed { stream_id } => Envelope {
                request: Some(REQUEST_SEED.to_owned()),
                stream_id: Some(stream_id),
                ..Default::default()
            },
            SignalMessage::OfferRequest { peer_id, stream_id } => Envelope {
                uuid: peer_id,
                request: Some(REQUEST_OFFER.to_owned()),
                stream_id,
                ..Default::default()
            },
            SignalMessage::Description {
                peer_id,
                stream_id,
                description,
            } => Envelope {
                uuid: peer_id,
                stream_id,
                description: Some(description),
                ..Default::default()
            },
            SignalMessage::Candidate {
                peer_id,
                stream_id,
                candidate,
            } => Envelope {
                uuid: peer_id,
                stream_id,
                candidate: Some(candidate),
                ..Default::default()
            },
            SignalMessage::Candidates {
                peer_id,
                stream_id,
                candidates,
            } => Envelope {
                uuid: peer_id,
                stream_id,
                candidates: Some(candidates),
                ..Default::default()
            },
        }
    }
}
