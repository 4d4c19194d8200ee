//! Course state machine.
//!
//! ```text
//! NoCourse ──start──▶ Focusing ──focus complete──▶ AwaitingReward
//!                        ▲                               │ draw, log, count
//!                        │                               ▼
//!                        ├──────── next focus ──────── Rewarded ──▶ Finished
//!                        │                               │ take break
//!                        └──────── break complete ──── Resting
//! ```
//!
//! An empty reward pool leaves the session uncounted and parks the flow in
//! `NothingToGive`, whose only exit is `end_course`. `end_course` is valid
//! from every phase and returns to `NoCourse`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::book::{CourseBook, SessionOutcome};
use super::model::{Course, CourseItem, CoursePlan, CourseSummary};
use crate::acquisition::AcquisitionLog;
use crate::catalog::Catalog;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::reward::{Draw, RewardEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NoCourse,
    Focusing,
    AwaitingReward,
    Rewarded,
    Resting,
    NothingToGive,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::NoCourse => "no_course",
            Phase::Focusing => "focusing",
            Phase::AwaitingReward => "awaiting_reward",
            Phase::Rewarded => "rewarded",
            Phase::Resting => "resting",
            Phase::NothingToGive => "nothing_to_give",
            Phase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished focus session produced.
#[derive(Debug, Clone, Serialize)]
pub struct RewardOutcome {
    pub draw: Option<Draw>,
    /// `None` when there was nothing to give and the session was not counted.
    pub session: Option<SessionOutcome>,
    pub events: Vec<Event>,
}

/// A draw taken but not yet fully recorded.
#[derive(Debug, Clone)]
struct PendingReward {
    draw: Option<Draw>,
    at: i64,
    logged: bool,
}

pub struct CourseFlow {
    book: CourseBook,
    log: AcquisitionLog,
    engine: RewardEngine,
    catalog: Catalog,
    phase: Phase,
    pending: Option<PendingReward>,
}

fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn phase_for(course: Option<&Course>) -> Phase {
    match course {
        None => Phase::NoCourse,
        Some(c) if c.is_finished() => Phase::Finished,
        Some(_) => Phase::Focusing,
    }
}

impl CourseFlow {
    /// The starting phase follows the persisted course: none, finished, or
    /// focusing on its next session.
    pub fn new(book: CourseBook, log: AcquisitionLog, engine: RewardEngine, catalog: Catalog) -> Self {
        let phase = phase_for(book.current());
        Self {
            book,
            log,
            engine,
            catalog,
            phase,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn course(&self) -> Option<&Course> {
        self.book.current()
    }

    pub fn book(&self) -> &CourseBook {
        &self.book
    }

    pub fn log(&self) -> &AcquisitionLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut AcquisitionLog {
        &mut self.log
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &RewardEngine {
        &self.engine
    }

    fn invalid(&self, operation: &str) -> CoreError {
        ValidationError::InvalidTransition {
            operation: operation.to_string(),
            phase: self.phase.to_string(),
        }
        .into()
    }

    fn focus_started(course: &Course, now: i64) -> Event {
        Event::FocusStarted {
            course_id: course.id.clone(),
            session_number: course.next_session_number(),
            duration_ms: course.focus_ms,
            at: timestamp(now),
        }
    }

    /// Create a course and enter its first focus session.
    pub async fn start_course(&mut self, plan: CoursePlan, now: i64) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        if let Some(previous) = self.book.current() {
            events.push(Event::CourseEnded {
                course_id: previous.id.clone(),
                completed_sessions: previous.completed_sessions,
                at: timestamp(now),
            });
        }
        let course = self.book.create_course(plan, now).await?;
        events.push(Event::CourseCreated {
            course_id: course.id.clone(),
            planned_sessions: course.planned_sessions,
            at: timestamp(now),
        });
        events.push(Self::focus_started(course, now));
        self.pending = None;
        self.phase = Phase::Focusing;
        Ok(events)
    }

    /// Handle a focus countdown reaching zero: draw once, log, then count.
    ///
    /// Allowed while focusing. From `AwaitingReward` it retries recording
    /// the draw already taken without drawing again.
    pub async fn on_focus_complete<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: i64,
    ) -> Result<RewardOutcome, CoreError> {
        match self.phase {
            Phase::Focusing => {
                let draw = self.engine.draw(self.catalog.items(), rng);
                self.pending = Some(PendingReward {
                    draw,
                    at: now,
                    logged: false,
                });
                self.phase = Phase::AwaitingReward;
            }
            Phase::AwaitingReward if self.pending.is_some() => {}
            _ => return Err(self.invalid("complete focus")),
        }
        self.finalize_reward().await
    }

    async fn finalize_reward(&mut self) -> Result<RewardOutcome, CoreError> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(self.invalid("finalize reward"));
        };
        let course_id = self.book.current().map(|c| c.id.clone()).unwrap_or_default();
        let at = timestamp(pending.at);
        let mut events = Vec::new();

        let Some(draw) = &pending.draw else {
            tracing::warn!(course_id = %course_id, "reward pool is empty, session not counted");
            events.push(Event::RewardEmpty { course_id, at });
            self.pending = None;
            self.phase = Phase::NothingToGive;
            return Ok(RewardOutcome {
                draw: None,
                session: None,
                events,
            });
        };
        if !pending.logged {
            self.log.record(&draw.item.id, pending.at).await?;
            pending.logged = true;
        }
        events.push(Event::RewardDrawn {
            course_id: course_id.clone(),
            item_id: draw.item.id.clone(),
            rarity: draw.rarity,
            at,
        });
        let item = CourseItem {
            item_id: draw.item.id.clone(),
            acquired_at: pending.at,
        };

        let session = self.book.complete_session(Some(item)).await?;
        let draw = self.pending.take().and_then(|p| p.draw);

        self.phase = match session {
            SessionOutcome::NoCourse => Phase::NoCourse,
            SessionOutcome::AlreadyFinished => Phase::Finished,
            SessionOutcome::Recorded {
                completed_sessions,
                planned_sessions,
                finished,
            } => {
                events.push(Event::SessionCompleted {
                    course_id: course_id.clone(),
                    completed_sessions,
                    planned_sessions,
                    at,
                });
                if finished {
                    events.push(Event::CourseFinished { course_id, at });
                    Phase::Finished
                } else {
                    Phase::Rewarded
                }
            }
        };

        Ok(RewardOutcome {
            draw,
            session: Some(session),
            events,
        })
    }

    pub fn take_break(&mut self, now: i64) -> Result<Event, CoreError> {
        if self.phase != Phase::Rewarded {
            return Err(self.invalid("take a break"));
        }
        let Some(course) = self.book.current() else {
            return Err(self.invalid("take a break"));
        };
        let event = Event::BreakStarted {
            course_id: course.id.clone(),
            duration_ms: course.break_ms,
            at: timestamp(now),
        };
        self.phase = Phase::Resting;
        Ok(event)
    }

    /// Start the next focus session, skipping or ending the break.
    /// A finished course never starts another one.
    pub fn next_focus(&mut self, now: i64) -> Result<Event, CoreError> {
        if !matches!(self.phase, Phase::Rewarded | Phase::Resting) {
            return Err(self.invalid("start the next focus"));
        }
        let Some(course) = self.book.current() else {
            return Err(self.invalid("start the next focus"));
        };
        if course.is_finished() {
            self.phase = Phase::Finished;
            return Err(self.invalid("start the next focus"));
        }
        let event = Self::focus_started(course, now);
        self.phase = Phase::Focusing;
        Ok(event)
    }

    pub fn on_break_complete(&mut self, now: i64) -> Result<Event, CoreError> {
        if self.phase != Phase::Resting {
            return Err(self.invalid("complete a break"));
        }
        self.next_focus(now)
    }

    /// Put an unfinished course back into its break after a restart.
    pub fn restore_break(&mut self) -> Result<(), CoreError> {
        match self.book.current() {
            Some(course) if !course.is_finished() => {
                self.phase = Phase::Resting;
                Ok(())
            }
            _ => Err(self.invalid("resume a break")),
        }
    }

    /// Re-check the finish condition. Returns true when the course is finished.
    pub fn resume_on_foreground(&mut self) -> bool {
        let finished = self.book.current().is_some_and(Course::is_finished);
        if finished && self.phase != Phase::Finished {
            tracing::info!("course found finished on resume");
            self.phase = Phase::Finished;
        }
        finished
    }

    /// End the current course from any phase. `None` when there was none.
    pub async fn end_course(&mut self, now: i64) -> Result<Option<(CourseSummary, Event)>, CoreError> {
        let Some(summary) = self.book.end_course().await? else {
            self.phase = Phase::NoCourse;
            return Ok(None);
        };
        self.pending = None;
        self.phase = Phase::NoCourse;
        let event = Event::CourseEnded {
            course_id: summary.course_id.clone(),
            completed_sessions: summary.completed_sessions,
            at: timestamp(now),
        };
        Ok(Some((summary, event)))
    }
}
