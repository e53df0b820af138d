use crate::models::{MotionSample, Severity};
use crate::services::profile::DetectionThresholds;

/// Total acceleration of a sample in m/s², gravity included. A sample
/// with any non-finite axis reads as 0.0 so a glitched sensor frame can
/// never raise a detection or poison downstream math.
pub fn magnitude(sample: &MotionSample) -> f64 {
    if !sample.is_well_formed() {
        return 0.0;
    }
    (sample.x.powi(2) + sample.y.powi(2) + sample.z.powi(2)).sqrt()
}

/// Whether a sample clears the candidate threshold. Strictly greater
/// than: a magnitude exactly at the threshold is not a candidate.
pub fn is_candidate(sample: &MotionSample, thresholds: &DetectionThresholds) -> bool {
    magnitude(sample) > thresholds.candidate_mps2
}

/// Severity tier for a candidate sample. Tier lower bounds are
/// exclusive: exactly at the medium cut is still `Low`, exactly at the
/// high cut is still `Medium`.
pub fn classify_severity(sample: &MotionSample, thresholds: &DetectionThresholds) -> Severity {
    let magnitude = magnitude(sample);
    if magnitude > thresholds.high_mps2 {
        Severity::High
    } else if magnitude > thresholds.medium_mps2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}
