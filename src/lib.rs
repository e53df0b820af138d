//! Event-processing core for a drive logger that detects potholes from
//! phone sensors. The platform shell feeds motion samples, GPS fixes
//! and speech transcripts into a [`SessionRecorder`]; it classifies
//! jolts against a [`DetectionProfile`], geotags them, tracks distance
//! and speed, and hands back a finished [`Session`] ready for export.

pub mod models;
pub mod services;

pub use models::{
    ConfirmationState, DiagnosticJolt, LocationSample, MotionSample, PotholeEvent, Session,
    Severity,
};
pub use services::{
    DetectionProfile, DetectionThresholds, DisplaySnapshot, JsonFileSink, LocationStreamError,
    MotionOutcome, ProfileStore, RecordError, ResolveOutcome, SensorMessage, SessionDocument,
    SessionPolicy, SessionRecorder, SessionSink, VoiceConfirmer,
};
