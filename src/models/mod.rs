mod event;
mod sample;
mod session;

pub use event::{ConfirmationState, PotholeEvent, Severity};
pub use sample::{LocationSample, MotionSample};
pub use session::{DiagnosticJolt, Session};
