use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoRtpStats {
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
    pub frames_per_second: Option<f64>,
    /// `bytesReceived` for inbound, `bytesSent` for outbound.
    pub bytes: u64,
    pub packets_lost: Option<i64>,
    pub jitter_seconds: Option<f64>,
}

/// The subset of a statistics report the sampler cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsEntry {
    InboundVideo(VideoRtpStats),
    OutboundVideo(VideoRtpStats),
    Codec {
        mime_type: String,
    },
    CandidatePair {
        succeeded: bool,
        current_round_trip_time: Option<f64>,
    },
}

impl StatsEntry {
    /// Reads one W3C-style report object (`type` plus camelCase members).
    /// snake_case member names are accepted as well. Audio RTP reports and
    /// unrelated types yield `None`.
    pub fn from_report(report: &Value) -> Option<Self> {
        let report_type = field(report, "type")?.as_str()?;

        match report_type {
            "inbound-rtp" if is_video(report) => Some(StatsEntry::InboundVideo(VideoRtpStats {
                bytes: u64_field(report, "bytesReceived").unwrap_or(0),
                packets_lost: field(report, "packetsLost").and_then(Value::as_i64),
                jitter_seconds: f64_field(report, "jitter"),
                ..video_common(report)
            })),
            "outbound-rtp" if is_video(report) => Some(StatsEntry::OutboundVideo(VideoRtpStats {
                bytes: u64_field(report, "bytesSent").unwrap_or(0),
                ..video_common(report)
            })),
            "codec" => {
                let mime_type = field(report, "mimeType")?.as_str()?;
                Some(StatsEntry::Codec {
                    mime_type: mime_type.to_owned(),
                })
            }
            "candidate-pair" => Some(StatsEntry::CandidatePair {
                succeeded: field(report, "state").and_then(Value::as_str) == Some("succeeded"),
                current_round_trip_time: f64_field(report, "currentRoundTripTime"),
            }),
            _ => None,
        }
    }
}

fn video_common(report: &Value) -> VideoRtpStats {
    VideoRtpStats {
        frame_width: u32_field(report, "frameWidth"),
        frame_height: u32_field(report, "frameHeight"),
        frames_per_second: f64_field(report, "framesPerSecond"),
        ..Default::default()
    }
}

fn is_video(report: &Value) -> bool {
    field(report, "kind")
        .or_else(|| field(report, "mediaType"))
        .and_then(Value::as_str)
        == Some("video")
}

fn field<'a>(report: &'a Value, camel: &str) -> Option<&'a Value> {
    report
        .get(camel)
        .or_else(|| report.get(to_snake_case(camel).as_str()))
        .filter(|value| !value.is_null())
}

fn u64_field(report: &Value, camel: &str) -> Option<u64> {
    field(report, camel).and_then(Value::as_u64)
}

fn u32_field(report: &Value, camel: &str) -> Option<u32> {
    u64_field(report, camel).and_then(|v| u32::try_from(v).ok())
}

fn f64_field(report: &Value, camel: &str) -> Option<f64> {
    field(report, camel).and_then(Value::as_f64)
}

fn to_snake_case(camel: &str) -> String {
    let mut snake = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}
