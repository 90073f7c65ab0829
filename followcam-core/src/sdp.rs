/// Pins the video section of an SDP blob to `target_kbps`.
///
/// Any `b=AS:` or `b=TIAS:` line inside the video media section is dropped and
/// a single `b=AS:<target_kbps>` is placed right after its `c=IN` line. Other
/// sections are left alone. Input without a video section is returned as is.
pub fn annotate_video_bandwidth(sdp: &str, target_kbps: u32) -> String {
    if !sdp.contains("m=video") {
        return sdp.to_owned();
    }

    let separator = if sdp.contains("\r\n") { "\r\n" } else { "\n" };
    let bandwidth = format!("b=AS:{target_kbps}");

    let mut lines: Vec<&str> = Vec::new();
    let mut in_video = false;

    for line in sdp.split(separator) {
        if line.starts_with("m=") {
            in_video = line.starts_with("m=video");
            lines.push(line);
            continue;
        }

        if in_video && (line.starts_with("b=AS:") || line.starts_with("b=TIAS:")) {
            continue;
        }

        lines.push(line);

        if in_video && line.starts_with("c=IN") {
            lines.push(&bandwidth);
        }
    }

    lines.join(separator)
}
