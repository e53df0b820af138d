use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{Session, Severity};
use crate::services::classifier;
use crate::services::profile::DetectionProfile;

/// Bumped whenever the exported document shape changes.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// The one artifact a finished drive leaves behind. Everything the
/// session recorded is nested inside unchanged, so a parsed document
/// gives back exactly the session that was exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    /// Profile the session was recorded under, so the numbers can be
    /// re-checked offline against the same or different thresholds.
    pub profile_id: String,
    pub session: Session,
}

impl SessionDocument {
    pub fn new(session: Session, profile_id: &str) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            profile_id: profile_id.to_string(),
            session,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize session document")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse session document")
    }
}

/// Where finished sessions go. The recorder does not care whether that
/// is a file, an upload queue or a test buffer.
pub trait SessionSink {
    fn export(&self, document: &SessionDocument) -> Result<()>;
}

/// Writes one pretty-printed JSON file per session into a directory.
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, document: &SessionDocument) -> PathBuf {
        self.dir.join(format!("session-{}.json", document.session.id))
    }
}

impl SessionSink for JsonFileSink {
    fn export(&self, document: &SessionDocument) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory: {:?}", self.dir))?;
        let path = self.path_for(document);
        let json = document.to_json()?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write session export: {:?}", path))?;
        info!("session {} exported to {:?}", document.session.id, path);
        Ok(())
    }
}

/// One event's tier movement under different thresholds. `severity`
/// is `None` when the recorded motion no longer clears the candidate
/// threshold at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReclassifiedEvent {
    pub event_id: String,
    pub recorded_severity: Severity,
    pub severity: Option<Severity>,
}

/// Re-runs the classifier over an exported document's events with
/// another profile's thresholds. Pure: the document is not touched, so
/// recorded drives can be re-checked offline without re-driving them.
pub fn reclassify(
    document: &SessionDocument,
    profile: &DetectionProfile,
) -> Vec<ReclassifiedEvent> {
    document
        .session
        .events
        .iter()
        .map(|event| {
            let severity = if classifier::is_candidate(&event.motion, &profile.thresholds) {
                Some(classifier::classify_severity(&event.motion, &profile.thresholds))
            } else {
                None
            };
            ReclassifiedEvent {
                event_id: event.id.clone(),
                recorded_severity: event.severity,
                severity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationSample, MotionSample, PotholeEvent, Session};
    use chrono::{Duration, TimeZone};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn finished_session() -> Session {
        let mut session = Session::new(ts(0));
        let motion = MotionSample::new(0.0, 0.0, 28.0, ts(10));
        let location = LocationSample::new(40.7, -73.9, Some(12.0), 5.0, ts(9));
        session
            .events
            .push(PotholeEvent::new(motion, location, Severity::High));
        let motion = MotionSample::new(0.0, 0.0, 21.0, ts(20));
        let location = LocationSample::new(40.71, -73.9, None, 5.0, ts(19));
        session
            .events
            .push(PotholeEvent::new(motion, location, Severity::Medium));
        session.total_distance_km = 2.5;
        session.close(ts(600));
        session
    }

    #[test]
    fn test_document_round_trips_losslessly() {
        let document = SessionDocument::new(finished_session(), "default");
        let json = document.to_json().unwrap();
        let back = SessionDocument::from_json(&json).unwrap();
        assert_eq!(back, document);
        assert_eq!(back.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(back.session.events.len(), 2);
    }

    #[test]
    fn test_file_sink_writes_parseable_json() {
        let dir = std::env::temp_dir().join(format!("roadlog-test-{}", uuid::Uuid::new_v4()));
        let sink = JsonFileSink::new(&dir);
        let document = SessionDocument::new(finished_session(), "default");

        sink.export(&document).unwrap();
        let path = sink.path_for(&document);
        let content = fs::read_to_string(&path).unwrap();
        let back = SessionDocument::from_json(&content).unwrap();
        assert_eq!(back.session.id, document.session.id);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reclassify_under_stricter_thresholds() {
        let document = SessionDocument::new(finished_session(), "default");

        let mut strict = DetectionProfile::default();
        strict.id = "strict".to_string();
        strict.thresholds.candidate_mps2 = 22.0;
        strict.thresholds.medium_mps2 = 26.0;
        strict.thresholds.high_mps2 = 30.0;

        let recheck = reclassify(&document, &strict);
        assert_eq!(recheck.len(), 2);
        // 28 m/s² is now only Medium; 21 m/s² is no candidate at all.
        assert_eq!(recheck[0].recorded_severity, Severity::High);
        assert_eq!(recheck[0].severity, Some(Severity::Medium));
        assert_eq!(recheck[1].severity, None);
    }

    #[test]
    fn test_reclassify_same_profile_agrees() {
        let document = SessionDocument::new(finished_session(), "default");
        let recheck = reclassify(&document, &DetectionProfile::default());
        for (checked, event) in recheck.iter().zip(&document.session.events) {
            assert_eq!(checked.severity, Some(event.severity));
        }
    }
}
