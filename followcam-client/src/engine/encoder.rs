#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationPreference {
    MaintainFramerate,
    MaintainResolution,
    Balanced,
}

/// Video sender encoding knobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderParameters {
    pub max_bitrate_bps: Option<u64>,
    pub scale_resolution_down_by: Option<f64>,
    pub degradation_preference: Option<DegradationPreference>,
}

impl EncoderParameters {
    /// Full resolution at the target ceiling; frames go before pixels do.
    pub fn optimize_for(&mut self, target_kbps: u32) {
        self.max_bitrate_bps = Some(u64::from(target_kbps) * 1000);
        self.scale_resolution_down_by = Some(1.0);
        self.degradation_preference = Some(DegradationPreference::MaintainResolution);
    }
}
