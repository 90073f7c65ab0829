use crate::capture::constraints::{FacingMode, MediaConstraints};
use crate::error::CaptureError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub const CONTENT_HINT_DETAIL: &str = "detail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => f.write_str("audio"),
            TrackKind::Video => f.write_str("video"),
        }
    }
}

/// What the device actually granted for a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
    pub facing_mode: Option<FacingMode>,
    pub sample_rate: Option<u32>,
    pub channel_count: Option<u16>,
}

/// Захваченный локальный трек (камера или микрофон).
pub trait MediaTrack: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn content_hint(&self) -> Option<String>;

    fn set_content_hint(&self, hint: &str);

    fn settings(&self) -> TrackSettings;

    fn stop(&self);
}

pub type TrackSet = Vec<Arc<dyn MediaTrack>>;

/// Источник медиа. Реализуется платформой, на которой запущен клиент.
#[async_trait]
pub trait MediaDevice: Send + Sync {
    async fn request_media(&self, constraints: &MediaConstraints) -> Result<TrackSet, CaptureError>;
}

pub fn has_video(tracks: &[Arc<dyn MediaTrack>]) -> bool {
    tracks.iter().any(|track| track.kind() == TrackKind::Video)
}
