use super::row::Recipient;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Delay between the last relevant keystroke and the lookup request.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(500);

/// Suggested cost target for a supplier name, as returned by the external
/// lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DepartmentSuggestion {
    #[serde(flatten)]
    pub recipient: Recipient,
    /// How often this supplier was previously booked to the target.
    pub frequency: u32,
}

/// Re-armable deadline for the supplier lookup.
///
/// Every relevant keystroke pokes the timer, superseding any pending
/// deadline; the lookup fires only once the deadline passes untouched.
/// The caller supplies the clock, which keeps the timer testable.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        DebounceTimer {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + delay`.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed; consumes the deadline so a
    /// poke-fire cycle issues exactly one lookup.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for DebounceTimer {
    fn default() -> Self {
        DebounceTimer::new(SUGGESTION_DEBOUNCE)
    }
}

/// Monotonic request sequence for the suggestion lookup.
///
/// At most one request is conceptually outstanding: issuing a new one
/// supersedes the previous, and a response is applied only when its
/// sequence number still matches the latest issued request. A stale
/// response arriving late is discarded, never blindly applied.
#[derive(Debug, Clone, Default)]
pub struct SuggestionTracker {
    next_seq: u64,
    latest: Option<u64>,
}

impl SuggestionTracker {
    pub fn new() -> Self {
        SuggestionTracker::default()
    }

    /// Issue a new request, superseding any outstanding one. Returns the
    /// sequence number to attach to the request.
    pub fn issue(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest = Some(seq);
        seq
    }

    /// Admit a response. True only for the latest issued request; the
    /// request is consumed, so a duplicate response is also rejected.
    pub fn accept(&mut self, seq: u64) -> bool {
        if self.latest == Some(seq) {
            self.latest = None;
            true
        } else {
            false
        }
    }

    /// Drop any outstanding request, e.g. on form reset.
    pub fn cancel(&mut self) {
        self.latest = None;
    }
}
