use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerStatus;

/// Every state change of the engine produces an Event.
/// Presentation layers render them; the CLI prints them as JSON on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_secs: u64,
        deadline_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        deadline_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        remaining_secs: u64,
        duration_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the single completion event of a countdown.
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. })
    }
}
