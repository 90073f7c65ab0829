use crate::engine::{StatsEntry, VideoRtpStats};
use followcam_core::Role;
use tokio::time::Instant;

/// Один снимок качества соединения.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub resolution: Option<(u32, u32)>,
    pub frames_per_second: Option<u32>,
    pub bitrate_bps: Option<f64>,
    pub codec: Option<String>,
    pub round_trip_time_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
    pub packets_lost: i64,
}

/// Keeps the previous byte counter so bitrate can be computed per poll.
/// Sender reads outbound video reports, viewer reads inbound ones.
#[derive(Debug)]
pub struct StatsSampler {
    role: Role,
    previous: Option<(u64, Instant)>,
}

impl StatsSampler {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            previous: None,
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn sample(&mut self, entries: &[StatsEntry], now: Instant) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot::default();

        for entry in entries {
            match entry {
                StatsEntry::InboundVideo(video) if self.role == Role::Viewer => {
                    snapshot.jitter_ms = video.jitter_seconds.map(|s| s * 1000.0);
                    snapshot.packets_lost = video.packets_lost.unwrap_or(0);
                    self.apply_video(video, now, &mut snapshot);
                }
                StatsEntry::OutboundVideo(video) if self.role == Role::Sender => {
                    self.apply_video(video, now, &mut snapshot);
                }
                StatsEntry::Codec { mime_type } if mime_type.starts_with("video/") => {
                    snapshot.codec = Some(mime_type.trim_start_matches("video/").to_owned());
                }
                StatsEntry::CandidatePair {
                    succeeded: true,
                    current_round_trip_time: Some(rtt),
                } => {
                    snapshot.round_trip_time_ms = Some(rtt * 1000.0);
                }
                _ => {}
            }
        }

        snapshot
    }

    fn apply_video(&mut self, video: &VideoRtpStats, now: Instant, snapshot: &mut StatsSnapshot) {
        if let (Some(width), Some(height)) = (video.frame_width, video.frame_height) {
            snapshot.resolution = Some((width, height));
        }
        snapshot.frames_per_second = video.frames_per_second.map(|fps| fps.round() as u32);

        if let Some((previous_bytes, previous_time)) = self.previous {
            let elapsed = now.saturating_duration_since(previous_time).as_secs_f64();
            if elapsed > 0.0 {
                let delta = video.bytes.saturating_sub(previous_bytes);
                snapshot.bitrate_bps = Some(8.0 * delta as f64 / elapsed);
            }
        }
        self.previous = Some((video.bytes, now));
    }
}
