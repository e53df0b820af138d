use tracing::debug;

use crate::models::{ConfirmationState, Session};

/// What a confirm or reject call actually did. Callers that race each
/// other (a tap and a voice match, say) get a clear answer instead of
/// an error or a silently clobbered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The event was pending and now holds the requested state.
    Applied,
    /// No event with that id exists in the session.
    NotFound,
    /// The event was already resolved; carries the standing state,
    /// which is never overwritten.
    AlreadyResolved(ConfirmationState),
}

/// Marks a pending event as driver-confirmed.
pub fn confirm(session: &mut Session, event_id: &str) -> ResolveOutcome {
    resolve(session, event_id, ConfirmationState::Confirmed)
}

/// Marks a pending event as a false positive.
pub fn reject(session: &mut Session, event_id: &str) -> ResolveOutcome {
    resolve(session, event_id, ConfirmationState::Rejected)
}

fn resolve(session: &mut Session, event_id: &str, verdict: ConfirmationState) -> ResolveOutcome {
    let Some(event) = session.events.iter_mut().find(|e| e.id == event_id) else {
        debug!("resolution for unknown event {} ignored", event_id);
        return ResolveOutcome::NotFound;
    };
    if event.confirmation.is_terminal() {
        debug!(
            "event {} already {}, keeping it",
            event_id,
            event.confirmation.as_str()
        );
        return ResolveOutcome::AlreadyResolved(event.confirmation);
    }
    event.confirmation = verdict;
    ResolveOutcome::Applied
}
