use followcam_client::{MediaTrack, TrackKind, TrackSettings};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory track that remembers its hint and whether it was stopped.
#[derive(Debug)]
pub struct FakeTrack {
    id: String,
    kind: TrackKind,
    hint: Mutex<Option<String>>,
    stopped: AtomicBool,
}

impl FakeTrack {
    pub fn new(id: &str, kind: TrackKind) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            hint: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn video() -> Self {
        Self::new("camera", TrackKind::Video)
    }

    pub fn audio() -> Self {
        Self::new("microphone", TrackKind::Audio)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn content_hint(&self) -> Option<String> {
        self.hint.lock().unwrap().clone()
    }

    fn set_content_hint(&self, hint: &str) {
        *self.hint.lock().unwrap() = Some(hint.to_owned());
    }

    fn settings(&self) -> TrackSettings {
        TrackSettings {
            width: Some(2560),
            height: Some(1440),
            frame_rate: Some(60.0),
            ..Default::default()
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
