use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;

/// Every state change in the system produces an Event.
/// Front ends render them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_ms: u64,
    },
    TimerCompleted {
        at: DateTime<Utc>,
    },
    TimerStopped {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CourseCreated {
        course_id: String,
        planned_sessions: u32,
        at: DateTime<Utc>,
    },
    RewardDrawn {
        course_id: String,
        item_id: String,
        rarity: Rarity,
        at: DateTime<Utc>,
    },
    /// The pool was empty. The session is not counted and only ending the
    /// course moves on.
    RewardEmpty {
        course_id: String,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        course_id: String,
        completed_sessions: u32,
        planned_sessions: u32,
        at: DateTime<Utc>,
    },
    BreakStarted {
        course_id: String,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    FocusStarted {
        course_id: String,
        session_number: u32,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    CourseFinished {
        course_id: String,
        at: DateTime<Utc>,
    },
    CourseEnded {
        course_id: String,
        completed_sessions: u32,
        at: DateTime<Utc>,
    },
}
