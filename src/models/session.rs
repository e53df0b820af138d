use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{ConfirmationState, PotholeEvent};

/// A low-severity candidate kept for diagnostics. These never count as
/// events; they exist so threshold tuning has data to look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticJolt {
    pub detected_at: DateTime<Utc>,
    pub magnitude: f64,
}

/// One recording run, from the driver starting a drive to ending it.
/// Events are append-only while the session is active. Confirmation
/// counts are always derived from the events themselves rather than
/// kept as separate counters, so they cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub events: Vec<PotholeEvent>,
    /// Sum of haversine deltas between consecutive GPS fixes, in km.
    pub total_distance_km: f64,
    /// Fixed once when the session closes; 0.0 until then.
    pub average_speed_kmh: f64,
    /// Low-severity candidates retained when the profile keeps them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticJolt>,
}

impl Session {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at,
            ended_at: None,
            events: Vec::new(),
            total_distance_km: 0.0,
            average_speed_kmh: 0.0,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Minutes from start to end. Still-active sessions are measured
    /// against the current clock so live displays can tick.
    pub fn duration_minutes(&self) -> f64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 60_000.0
    }

    /// Stamps the end time and fixes the average speed as
    /// `total_distance_km / duration_minutes * 60`. A zero-length
    /// session averages 0. Closing an already-closed session is a no-op
    /// so the numbers are computed exactly once.
    pub fn close(&mut self, ended_at: DateTime<Utc>) {
        if self.ended_at.is_some() {
            return;
        }
        self.ended_at = Some(ended_at);
        let minutes = self.duration_minutes();
        self.average_speed_kmh = if minutes > 0.0 {
            self.total_distance_km / minutes * 60.0
        } else {
            0.0
        };
    }

    pub fn pending_count(&self) -> usize {
        self.count_in(ConfirmationState::Pending)
    }

    pub fn confirmed_count(&self) -> usize {
        self.count_in(ConfirmationState::Confirmed)
    }

    pub fn rejected_count(&self) -> usize {
        self.count_in(ConfirmationState::Rejected)
    }

    fn count_in(&self, state: ConfirmationState) -> usize {
        self.events
            .iter()
            .filter(|e| e.confirmation == state)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample::{LocationSample, MotionSample};
    use crate::models::Severity;
    use chrono::{Duration, TimeZone};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn make_event(at: DateTime<Utc>) -> PotholeEvent {
        let motion = MotionSample::new(0.0, 0.0, 28.0, at);
        let location = LocationSample::new(40.7, -73.9, Some(12.0), 5.0, at);
        PotholeEvent::new(motion, location, Severity::High)
    }

    #[test]
    fn test_new_session_is_active_and_empty() {
        let session = Session::new(ts(0));
        assert!(session.is_active());
        assert!(session.events.is_empty());
        assert_eq!(session.total_distance_km, 0.0);
        assert_eq!(session.average_speed_kmh, 0.0);
    }

    #[test]
    fn test_close_fixes_average_speed() {
        let mut session = Session::new(ts(0));
        session.total_distance_km = 2.0;
        session.close(ts(360));
        assert!(!session.is_active());
        assert!((session.duration_minutes() - 6.0).abs() < 1e-9);
        // 2 km over 6 minutes is 20 km/h.
        assert!((session.average_speed_kmh - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_zero_duration_averages_zero() {
        let mut session = Session::new(ts(0));
        session.total_distance_km = 1.5;
        session.close(ts(0));
        assert_eq!(session.average_speed_kmh, 0.0);
    }

    #[test]
    fn test_close_twice_keeps_first_end() {
        let mut session = Session::new(ts(0));
        session.total_distance_km = 1.0;
        session.close(ts(60));
        let first_avg = session.average_speed_kmh;
        session.close(ts(600));
        assert_eq!(session.ended_at, Some(ts(60)));
        assert_eq!(session.average_speed_kmh, first_avg);
    }

    #[test]
    fn test_counts_derive_from_events() {
        let mut session = Session::new(ts(0));
        session.events.push(make_event(ts(10)));
        session.events.push(make_event(ts(20)));
        session.events.push(make_event(ts(30)));
        session.events[0].confirmation = ConfirmationState::Confirmed;
        session.events[1].confirmation = ConfirmationState::Rejected;

        assert_eq!(session.confirmed_count(), 1);
        assert_eq!(session.rejected_count(), 1);
        assert_eq!(session.pending_count(), 1);
    }
}
