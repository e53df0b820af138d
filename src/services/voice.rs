use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::debug;

use crate::models::{ConfirmationState, Session};
use crate::services::profile::SessionPolicy;

/// Matches recognized speech against the confirmation keyword. The
/// keyword confirms the most recently detected pending event, and only
/// while that detection is still fresh; the timing rule lives here, not
/// in whatever speech engine produced the transcript.
pub struct VoiceConfirmer {
    keyword_pattern: Regex,
    window: Duration,
}

impl VoiceConfirmer {
    pub fn new(policy: &SessionPolicy) -> Self {
        // Whole-word, case-insensitive. The keyword is escaped, so a
        // configured word can never be misread as regex syntax.
        let pattern = format!(r"(?i)\b{}\b", regex::escape(policy.voice_keyword.trim()));
        Self {
            keyword_pattern: Regex::new(&pattern).unwrap(),
            window: Duration::milliseconds((policy.voice_window_secs * 1000.0) as i64),
        }
    }

    /// Returns the id of the event a transcript confirms, if any: the
    /// newest pending event whose detection happened no longer than the
    /// window before `heard_at`. Everything else is ignored.
    pub fn match_utterance(
        &self,
        transcript: &str,
        heard_at: DateTime<Utc>,
        session: &Session,
    ) -> Option<String> {
        if !self.keyword_pattern.is_match(transcript) {
            return None;
        }

        let newest_pending = session
            .events
            .iter()
            .rev()
            .find(|e| e.confirmation == ConfirmationState::Pending)?;

        let age = heard_at.signed_duration_since(newest_pending.detected_at);
        if age < Duration::zero() || age > self.window {
            debug!(
                "keyword heard {}ms after event {}, outside the window",
                age.num_milliseconds(),
                newest_pending.id
            );
            return None;
        }

        Some(newest_pending.id.clone())
    }
}
