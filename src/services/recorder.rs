use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    DiagnosticJolt, LocationSample, MotionSample, PotholeEvent, Session, Severity,
};
use crate::services::classifier;
use crate::services::ledger::{self, ResolveOutcome};
use crate::services::profile::DetectionProfile;
use crate::services::voice::VoiceConfirmer;

/// Everything the platform shell pushes into the recorder. The two
/// sensor streams arrive in no guaranteed relative order; utterances
/// come from whatever speech engine the shell runs.
#[derive(Debug, Clone)]
pub enum SensorMessage {
    Motion(MotionSample),
    Location(LocationSample),
    /// The location stream stopped delivering fixes. Recording keeps
    /// going; detections are suppressed until a fix arrives.
    LocationFailed(LocationStreamError),
    Utterance {
        transcript: String,
        heard_at: DateTime<Utc>,
    },
}

/// Why the location stream went quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStreamError {
    PermissionDenied,
    Unavailable,
    Timeout,
}

/// Lifecycle misuse. Neither variant mutates anything.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("a session is already active")]
    SessionAlreadyActive,
    #[error("no active session")]
    NoActiveSession,
}

/// What became of one motion sample.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionOutcome {
    /// Below the candidate threshold, or no session running.
    Ignored,
    /// A candidate with no GPS fix to stamp it with; suppressed.
    NotGeotaggable,
    /// A candidate below the medium cut; kept out of the event list.
    LowSeverity,
    Logged {
        event_id: String,
        severity: Severity,
    },
}

/// Live values for the in-drive display.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    /// Magnitude of the latest motion sample, in m/s².
    pub current_magnitude: f64,
    pub current_location: Option<LocationSample>,
    /// Last known ground speed in km/h. Holds its previous value across
    /// fixes that carry no speed, so the readout never flickers to zero.
    pub display_speed_kmh: Option<f64>,
    pub total_distance_km: f64,
    pub event_count: usize,
    pub pending_count: usize,
    pub confirmed_count: usize,
    pub rejected_count: usize,
}

struct ActiveDrive {
    session: Session,
    /// Most recent accepted fix. Geotag source for new events and the
    /// anchor for the next distance delta.
    last_fix: Option<LocationSample>,
    current_magnitude: f64,
    display_speed_kmh: Option<f64>,
}

/// Owns all recording state for one drive at a time and consumes sensor
/// messages one by one. State changes only through these methods, so a
/// caller that feeds it from a single thread (or behind a mutex) always
/// observes a consistent session.
pub struct SessionRecorder {
    profile: DetectionProfile,
    voice: VoiceConfirmer,
    active: Option<ActiveDrive>,
}

impl SessionRecorder {
    pub fn new(profile: DetectionProfile) -> Self {
        let voice = VoiceConfirmer::new(&profile.policy);
        Self {
            profile,
            voice,
            active: None,
        }
    }

    pub fn profile(&self) -> &DetectionProfile {
        &self.profile
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// The session recorded so far, while a drive is running.
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|drive| &drive.session)
    }

    /// Starts a new session and returns its id.
    pub fn start(&mut self) -> Result<String, RecordError> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, at: DateTime<Utc>) -> Result<String, RecordError> {
        if self.active.is_some() {
            return Err(RecordError::SessionAlreadyActive);
        }
        let session = Session::new(at);
        let id = session.id.clone();
        info!("session {} started", id);
        self.active = Some(ActiveDrive {
            session,
            last_fix: None,
            current_magnitude: 0.0,
            display_speed_kmh: None,
        });
        Ok(id)
    }

    /// Ends the active session and hands it back finalized, with the
    /// end time stamped and the average speed fixed. The recorder keeps
    /// nothing; pass the session on to a sink to persist it.
    pub fn end(&mut self) -> Result<Session, RecordError> {
        self.end_at(Utc::now())
    }

    pub fn end_at(&mut self, at: DateTime<Utc>) -> Result<Session, RecordError> {
        let mut drive = self.active.take().ok_or(RecordError::NoActiveSession)?;
        drive.session.close(at);
        info!(
            "session {} ended: {} event(s), {:.2} km",
            drive.session.id,
            drive.session.events.len(),
            drive.session.total_distance_km
        );
        Ok(drive.session)
    }

    /// Feeds one message from the shell. Outcomes are logged rather
    /// than returned; shells that need them call the typed methods.
    pub fn handle(&mut self, message: SensorMessage) {
        match message {
            SensorMessage::Motion(sample) => {
                self.record_motion(sample);
            }
            SensorMessage::Location(sample) => self.record_location(sample),
            SensorMessage::LocationFailed(error) => self.report_location_error(error),
            SensorMessage::Utterance {
                transcript,
                heard_at,
            } => {
                self.hear_utterance(&transcript, heard_at);
            }
        }
    }

    /// Runs one motion sample through the classifier and, when it
    /// qualifies, appends an event to the session.
    pub fn record_motion(&mut self, sample: MotionSample) -> MotionOutcome {
        let Some(drive) = self.active.as_mut() else {
            debug!("motion sample with no active session, dropped");
            return MotionOutcome::Ignored;
        };

        // Display state always tracks the newest sample, candidate or not.
        let magnitude = classifier::magnitude(&sample);
        drive.current_magnitude = magnitude;

        if !classifier::is_candidate(&sample, &self.profile.thresholds) {
            return MotionOutcome::Ignored;
        }

        // A candidate without a fix cannot be placed on a map, so it is
        // not recorded at all.
        let Some(fix) = drive.last_fix else {
            debug!("jolt of {:.1} m/s² with no location fix, suppressed", magnitude);
            return MotionOutcome::NotGeotaggable;
        };

        let severity = classifier::classify_severity(&sample, &self.profile.thresholds);
        if severity == Severity::Low {
            if self.profile.policy.keep_low_severity {
                drive.session.diagnostics.push(DiagnosticJolt {
                    detected_at: sample.captured_at,
                    magnitude,
                });
            }
            debug!("low severity jolt of {:.1} m/s², not logged", magnitude);
            return MotionOutcome::LowSeverity;
        }

        let event = PotholeEvent::new(sample, fix, severity);
        let event_id = event.id.clone();
        info!(
            "event {} logged: {} at {:.1} m/s²",
            event_id,
            severity.as_str(),
            magnitude
        );
        drive.session.events.push(event);
        MotionOutcome::Logged { event_id, severity }
    }

    /// Takes one GPS fix: advances the distance sum, the geotag anchor
    /// and the display speed.
    pub fn record_location(&mut self, sample: LocationSample) {
        let Some(drive) = self.active.as_mut() else {
            debug!("location fix with no active session, dropped");
            return;
        };
        if !sample.is_well_formed() {
            warn!("malformed location fix dropped");
            return;
        }

        if let Some(previous) = drive.last_fix {
            let meters = haversine_distance(
                previous.latitude,
                previous.longitude,
                sample.latitude,
                sample.longitude,
            );
            drive.session.total_distance_km += meters / 1000.0;
        }
        // The anchor advances even across a GPS jump; the jump counts
        // as traveled distance.
        drive.last_fix = Some(sample);

        if let Some(kmh) = sample.speed_kmh() {
            drive.display_speed_kmh = Some(kmh);
        }
    }

    /// A location stream failure only means no further fixes arrive.
    /// The session keeps running and candidates go unrecorded for want
    /// of a geotag.
    pub fn report_location_error(&self, error: LocationStreamError) {
        warn!("location stream failed: {:?}", error);
    }

    /// Feeds one speech transcript. Returns the id of the event it
    /// confirmed, when the keyword was heard inside the confirmation
    /// window of the newest pending event.
    pub fn hear_utterance(
        &mut self,
        transcript: &str,
        heard_at: DateTime<Utc>,
    ) -> Option<String> {
        let drive = self.active.as_mut()?;
        let event_id = self
            .voice
            .match_utterance(transcript, heard_at, &drive.session)?;
        match ledger::confirm(&mut drive.session, &event_id) {
            ResolveOutcome::Applied => {
                info!("event {} confirmed by voice", event_id);
                Some(event_id)
            }
            _ => None,
        }
    }

    /// Driver tapped "confirm" on an event.
    pub fn confirm(&mut self, event_id: &str) -> ResolveOutcome {
        match self.active.as_mut() {
            Some(drive) => ledger::confirm(&mut drive.session, event_id),
            None => ResolveOutcome::NotFound,
        }
    }

    /// Driver tapped "not a pothole" on an event.
    pub fn reject(&mut self, event_id: &str) -> ResolveOutcome {
        match self.active.as_mut() {
            Some(drive) => ledger::reject(&mut drive.session, event_id),
            None => ResolveOutcome::NotFound,
        }
    }

    /// Current values for the in-drive display, while one is running.
    pub fn snapshot(&self) -> Option<DisplaySnapshot> {
        let drive = self.active.as_ref()?;
        let session = &drive.session;
        Some(DisplaySnapshot {
            session_id: session.id.clone(),
            started_at: session.started_at,
            current_magnitude: drive.current_magnitude,
            current_location: drive.last_fix,
            display_speed_kmh: drive.display_speed_kmh,
            total_distance_km: session.total_distance_km,
            event_count: session.events.len(),
            pending_count: session.pending_count(),
            confirmed_count: session.confirmed_count(),
            rejected_count: session.rejected_count(),
        })
    }
}

/// Calculate haversine distance between two GPS points in meters
fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}
