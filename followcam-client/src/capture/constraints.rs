use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

/// `min` / `ideal` / `max` bounds, as understood by the capture device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConstrainRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl ConstrainRange {
    pub fn ideal(ideal: u32) -> Self {
        Self {
            ideal: Some(ideal),
            ..Default::default()
        }
    }

    pub fn with_min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub width: ConstrainRange,
    pub height: ConstrainRange,
    pub frame_rate: ConstrainRange,
    pub facing_mode: FacingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub sample_rate: u32,
    pub channel_count: u16,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
            sample_rate: 48_000,
            channel_count: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl MediaConstraints {
    /// Rear camera, 1440p preferred and never below 720p, 60 fps.
    pub fn high_quality() -> Self {
        Self {
            video: VideoConstraints {
                width: ConstrainRange::ideal(2560).with_min(1280),
                height: ConstrainRange::ideal(1440).with_min(720),
                frame_rate: ConstrainRange::ideal(60).with_max(60),
                facing_mode: FacingMode::Environment,
            },
            audio: AudioConstraints::default(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            video: VideoConstraints {
                width: ConstrainRange::ideal(1920),
                height: ConstrainRange::ideal(1080),
                frame_rate: ConstrainRange::ideal(60).with_max(60),
                facing_mode: FacingMode::Environment,
            },
            audio: AudioConstraints::default(),
        }
    }
}
