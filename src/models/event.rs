use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sample::{LocationSample, MotionSample};

/// How hard the jolt was. Ordering follows tier order, so `High` compares
/// greater than `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Where an event stands with the driver. Events are born `Pending` and
/// move at most once, to `Confirmed` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationState {
    Pending,
    Confirmed,
    Rejected,
}

impl ConfirmationState {
    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationState::Pending => "pending",
            ConfirmationState::Confirmed => "confirmed",
            ConfirmationState::Rejected => "rejected",
        }
    }
}

/// A logged pothole detection: the triggering motion sample, the GPS fix
/// it was stamped with, and the driver's verdict so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotholeEvent {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    /// The motion sample that crossed the candidate threshold.
    pub motion: MotionSample,
    /// GPS fix current at detection time. Detections without one are
    /// suppressed before an event is ever built.
    pub location: LocationSample,
    /// Ground speed from the fix, in m/s, when it carried one.
    pub speed_at_detection: Option<f64>,
    pub severity: Severity,
    pub confirmation: ConfirmationState,
}

impl PotholeEvent {
    pub fn new(motion: MotionSample, location: LocationSample, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            detected_at: motion.captured_at,
            motion,
            location,
            speed_at_detection: location.speed_mps,
            severity,
            confirmation: ConfirmationState::Pending,
        }
    }
}
