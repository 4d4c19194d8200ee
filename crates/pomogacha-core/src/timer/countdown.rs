//! Countdown state machine.
//!
//! Like the rest of the core it has no internal thread: each `tick()` call
//! removes one quantum from the remaining time. [`super::TimerDriver`] calls
//! `tick()` on a fixed cadence; tests call it directly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Idle
//! ```
//!
//! Reaching zero while running moves back to `Idle` and reports
//! `TimerCompleted` once. A later tick sees `Idle` and does nothing, so one
//! `start()` can only ever complete once.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Default tick quantum and cadence.
pub const TICK_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    state: TimerState,
    remaining_ms: u64,
    /// Used when `start()` is called without a duration.
    default_ms: u64,
    quantum_ms: u64,
}

impl Countdown {
    pub fn new(default_ms: u64) -> Self {
        Self::with_quantum(default_ms, TICK_MS)
    }

    /// A zero quantum is bumped to 1 ms so the countdown always progresses.
    pub fn with_quantum(default_ms: u64, quantum_ms: u64) -> Self {
        Self {
            state: TimerState::Idle,
            remaining_ms: default_ms,
            default_ms,
            quantum_ms: quantum_ms.max(1),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn quantum_ms(&self) -> u64 {
        self.quantum_ms
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// (Re)start from `duration_ms`, or from the default when `None`.
    pub fn start(&mut self, duration_ms: Option<u64>) -> Event {
        let duration = duration_ms.unwrap_or(self.default_ms);
        self.remaining_ms = duration;
        self.state = TimerState::Running;
        Event::TimerStarted {
            duration_ms: duration,
            at: Utc::now(),
        }
    }

    /// Freeze the remaining time. Pausing twice is harmless.
    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Paused | TimerState::Idle => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Idle => None,
        }
    }

    /// Return to idle without completing.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == TimerState::Idle {
            return None;
        }
        self.state = TimerState::Idle;
        Some(Event::TimerStopped {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Advance by one quantum.
    ///
    /// Returns `TimerTicked` while time remains, `TimerCompleted` on the tick
    /// that reaches zero, and `None` when not running.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(self.quantum_ms);
        if self.remaining_ms == 0 {
            self.state = TimerState::Idle;
            return Some(Event::TimerCompleted { at: Utc::now() });
        }
        Some(Event::TimerTicked {
            remaining_ms: self.remaining_ms,
        })
    }
}
