use crate::capture::constraints::MediaConstraints;
use crate::capture::media::{CONTENT_HINT_DETAIL, MediaDevice, TrackKind, TrackSet};
use crate::error::CaptureError;
use tracing::{debug, error, info, warn};

/// Acquires camera and microphone, dropping to 1080p once if the device
/// refuses the high-quality set.
pub async fn start_capture(device: &dyn MediaDevice) -> Result<TrackSet, CaptureError> {
    let constraints = MediaConstraints::high_quality();
    debug!("Requesting media with {:?}", constraints);

    let tracks = match device.request_media(&constraints).await {
        Ok(tracks) => tracks,
        Err(primary) => {
            warn!("Capture failed ({}), falling back to 1080p60", primary);

            device
                .request_media(&MediaConstraints::fallback())
                .await
                .map_err(|fallback| {
                    error!("Fallback capture also failed: {}", fallback);
                    CaptureError::Unavailable {
                        primary: primary.to_string(),
                        fallback: fallback.to_string(),
                    }
                })?
        }
    };

    for track in tracks.iter().filter(|t| t.kind() == TrackKind::Video) {
        track.set_content_hint(CONTENT_HINT_DETAIL);
        info!("Video track {} settings: {:?}", track.id(), track.settings());
    }

    Ok(tracks)
}
