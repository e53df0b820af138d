pub mod classifier;
pub mod exporter;
pub mod ledger;
pub mod profile;
pub mod recorder;
pub mod voice;

pub use exporter::{JsonFileSink, ReclassifiedEvent, SessionDocument, SessionSink};
pub use ledger::ResolveOutcome;
pub use profile::{DetectionProfile, DetectionThresholds, ProfileStore, SessionPolicy};
pub use recorder::{
    DisplaySnapshot, LocationStreamError, MotionOutcome, RecordError, SensorMessage,
    SessionRecorder,
};
pub use voice::VoiceConfirmer;
