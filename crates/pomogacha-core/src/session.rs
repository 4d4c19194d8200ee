//! Front door wiring storage, settings, courses, rewards and recovery.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::acquisition::AcquisitionLog;
use crate::catalog::Catalog;
use crate::course::{CourseBook, CourseFlow, CoursePlan, CourseSummary, Phase, RewardOutcome};
use crate::error::CoreError;
use crate::events::Event;
use crate::recovery::{
    LogNotifier, Notifier, Reconciliation, Recovery, SnapshotMode, TimerSnapshot, Visibility,
};
use crate::reward::{reward_rng, RewardEngine, RewardRng};
use crate::storage::{Config, Database, SettingsStore, Store};
use crate::time::now_ms;
use crate::timer::Countdown;

/// What coming back to the foreground did.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryReport {
    pub reconciliation: Option<Reconciliation>,
    /// Reward drawn for a focus session that ended while inactive.
    pub reward: Option<RewardOutcome>,
    pub events: Vec<Event>,
    pub phase: Phase,
}

pub struct Session {
    store: Store,
    config: Config,
    settings: SettingsStore,
    flow: CourseFlow,
    recovery: Recovery,
    rng: RewardRng,
}

impl Session {
    /// Open against the configured sqlite database with a logging notifier.
    pub async fn open_default(config: Config) -> Result<Self, CoreError> {
        let db = Database::open_at(&config.database_path()?)?;
        Self::open(config, Store::new(db), Arc::new(LogNotifier::default())).await
    }

    pub async fn open(config: Config, store: Store, notifier: Arc<dyn Notifier>) -> Result<Self, CoreError> {
        config.validate()?;
        let catalog = match &config.reward.catalog_path {
            Some(path) => Catalog::from_json_file(Path::new(path))?,
            None => Catalog::builtin(),
        };
        let engine = RewardEngine::new(config.reward.weights.clone())?;
        let settings = SettingsStore::load(store.clone()).await;
        let book = CourseBook::load(store.clone()).await;
        let log = AcquisitionLog::load(store.clone()).await;
        let recovery = Recovery::new(store.clone(), notifier, config.notifications.clone());
        let rng = reward_rng(config.reward.seed);
        tracing::debug!(items = catalog.len(), "session opened");

        Ok(Self {
            store,
            flow: CourseFlow::new(book, log, engine, catalog),
            settings,
            recovery,
            rng,
            config,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn flow(&self) -> &CourseFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut CourseFlow {
        &mut self.flow
    }

    pub fn recovery(&self) -> &Recovery {
        &self.recovery
    }

    pub fn rng_mut(&mut self) -> &mut RewardRng {
        &mut self.rng
    }

    /// Start a course; unset durations come from the user's settings.
    pub async fn start_course(
        &mut self,
        planned_sessions: u32,
        focus_ms: Option<u64>,
        break_ms: Option<u64>,
    ) -> Result<Vec<Event>, CoreError> {
        let defaults = self.settings.get();
        let plan = CoursePlan::new(
            planned_sessions,
            focus_ms.unwrap_or(defaults.default_focus_ms),
            break_ms.unwrap_or(defaults.default_break_ms),
        );
        self.flow.start_course(plan, now_ms()).await
    }

    /// Countdown for the current course's next focus or break, at the
    /// configured tick quantum.
    pub fn countdown(&self, mode: SnapshotMode) -> Countdown {
        let settings = self.settings.get();
        let duration = match (mode, self.flow.course()) {
            (SnapshotMode::Focus, Some(course)) => course.focus_ms,
            (SnapshotMode::Break, Some(course)) => course.break_ms,
            (SnapshotMode::Focus, None) => settings.default_focus_ms,
            (SnapshotMode::Break, None) => settings.default_break_ms,
        };
        Countdown::with_quantum(duration, self.config.timer.tick_ms)
    }

    /// A focus countdown reached zero in the foreground.
    pub async fn complete_focus(&mut self) -> Result<RewardOutcome, CoreError> {
        let outcome = self.flow.on_focus_complete(&mut self.rng, now_ms()).await?;
        self.recovery.on_timer_finished().await?;
        Ok(outcome)
    }

    pub fn take_break(&mut self) -> Result<Event, CoreError> {
        self.flow.take_break(now_ms())
    }

    pub fn next_focus(&mut self) -> Result<Event, CoreError> {
        self.flow.next_focus(now_ms())
    }

    /// A break countdown reached zero in the foreground.
    pub async fn complete_break(&mut self) -> Result<Event, CoreError> {
        let event = self.flow.on_break_complete(now_ms())?;
        self.recovery.on_timer_finished().await?;
        Ok(event)
    }

    pub async fn end_course(&mut self) -> Result<Option<(CourseSummary, Event)>, CoreError> {
        let ended = self.flow.end_course(now_ms()).await?;
        if ended.is_some() {
            self.recovery.on_timer_finished().await?;
        }
        Ok(ended)
    }

    /// Going inactive with `remaining_ms` left on a `mode` countdown.
    pub async fn suspend(
        &mut self,
        mode: SnapshotMode,
        remaining_ms: u64,
    ) -> Result<Option<TimerSnapshot>, CoreError> {
        let snapshot = TimerSnapshot {
            mode,
            remaining_ms,
            course_id: self.flow.course().map(|c| c.id.clone()),
            saved_at: 0,
        };
        self.recovery.snapshot(move || Some(snapshot.clone()));
        self.recovery
            .on_visibility_change(Visibility::Inactive, now_ms())
            .await
    }

    pub async fn resume(&mut self) -> Result<RecoveryReport, CoreError> {
        self.resume_at(now_ms()).await
    }

    /// Back in the foreground at `now`: reconcile any snapshot, then
    /// re-check whether the course is finished.
    pub async fn resume_at(&mut self, now: i64) -> Result<RecoveryReport, CoreError> {
        self.recovery
            .on_visibility_change(Visibility::Active, now)
            .await?;
        let course_id = self.flow.course().map(|c| c.id.clone());
        let reconciliation = self.recovery.recover(course_id.as_deref(), now).await?;

        let mut events = Vec::new();
        let mut reward = None;
        let unfinished = self.flow.course().is_some_and(|c| !c.is_finished());
        match &reconciliation {
            Some(Reconciliation::Elapsed {
                mode: SnapshotMode::Focus,
                overdue_ms,
            }) if self.flow.phase() == Phase::Focusing => {
                let ended_at = now.saturating_sub(i64::try_from(*overdue_ms).unwrap_or(i64::MAX));
                let outcome = self.flow.on_focus_complete(&mut self.rng, ended_at).await?;
                events.extend(outcome.events.iter().cloned());
                reward = Some(outcome);
            }
            Some(Reconciliation::Elapsed {
                mode: SnapshotMode::Break,
                ..
            }) if unfinished => {
                self.flow.restore_break()?;
                events.push(self.flow.on_break_complete(now)?);
            }
            Some(Reconciliation::Resume {
                mode: SnapshotMode::Break,
                ..
            }) if unfinished => {
                self.flow.restore_break()?;
            }
            _ => {}
        }
        self.flow.resume_on_foreground();

        Ok(RecoveryReport {
            reconciliation,
            reward,
            events,
            phase: self.flow.phase(),
        })
    }
}
