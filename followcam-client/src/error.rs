use followcam_core::CodecError;
use std::time::Duration;
use thiserror::Error;

pub const CAPTURE_ERROR_MESSAGE: &str = "Camera access denied or unavailable";
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection failed — check network";
pub const SIGNALING_FAILED_MESSAGE: &str = "Signaling connection failed";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("invalid ICE candidate: {0}")]
    Candidate(#[from] serde_json::Error),

    #[error("no video sender on this connection")]
    NoVideoSender,

    #[error("not supported by this engine: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("media device error: {0}")]
    Device(String),

    #[error("{CAPTURE_ERROR_MESSAGE} (high quality: {primary}; fallback: {fallback})")]
    Unavailable { primary: String, fallback: String },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("relay unreachable: {0}")]
    Unreachable(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling session is not running")]
    SessionClosed,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
