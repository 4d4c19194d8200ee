//! Crash and backgrounding recovery.
//!
//! When the app goes inactive the registered provider describes the running
//! countdown, the snapshot is stored under `snapshot`, and a local
//! notification is scheduled for the moment it would reach zero. Coming back
//! cancels the notification; [`Recovery::recover`] then reconciles the
//! snapshot against the current course and the wall clock and clears it.

mod notifier;
mod snapshot;

pub use notifier::{LogNotifier, Notifier, ScheduledNotification};
pub use snapshot::{reconcile, Reconciliation, SnapshotMode, TimerSnapshot};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StorageError};
use crate::storage::{NotificationsConfig, StorageKey, Store};

/// Host visibility signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Active,
    Inactive,
}

/// Describes the running countdown, or `None` when nothing runs.
/// `saved_at` is overwritten when the snapshot is stored.
pub type SnapshotProvider = Box<dyn Fn() -> Option<TimerSnapshot> + Send + Sync>;

pub struct Recovery {
    store: Store,
    notifier: Arc<dyn Notifier>,
    texts: NotificationsConfig,
    provider: Option<SnapshotProvider>,
}

impl Recovery {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>, texts: NotificationsConfig) -> Self {
        Self {
            store,
            notifier,
            texts,
            provider: None,
        }
    }

    /// Register the snapshot source, replacing any previous one.
    pub fn snapshot(&mut self, provider: impl Fn() -> Option<TimerSnapshot> + Send + Sync + 'static) {
        self.provider = Some(Box::new(provider));
    }

    pub async fn on_visibility_change(
        &mut self,
        visibility: Visibility,
        now: i64,
    ) -> Result<Option<TimerSnapshot>, CoreError> {
        match visibility {
            Visibility::Inactive => self.suspend(now).await,
            Visibility::Active => {
                self.notifier.cancel_all().await?;
                Ok(self.load_snapshot().await)
            }
        }
    }

    async fn suspend(&mut self, now: i64) -> Result<Option<TimerSnapshot>, CoreError> {
        let Some(mut snapshot) = self.provider.as_ref().and_then(|provide| provide()) else {
            tracing::debug!("going inactive with no running countdown");
            return Ok(None);
        };
        snapshot.saved_at = now;
        self.store.save(StorageKey::TimerSnapshot, &snapshot).await?;

        let (title, body) = match snapshot.mode {
            SnapshotMode::Focus => (&self.texts.focus_title, &self.texts.focus_body),
            SnapshotMode::Break => (&self.texts.break_title, &self.texts.break_body),
        };
        self.notifier.cancel_all().await?;
        self.notifier
            .schedule_local(snapshot.remaining_ms, title, body)
            .await?;
        tracing::info!(
            mode = %snapshot.mode,
            remaining_ms = snapshot.remaining_ms,
            "snapshot saved"
        );
        Ok(Some(snapshot))
    }

    pub async fn load_snapshot(&self) -> Option<TimerSnapshot> {
        self.store.load(StorageKey::TimerSnapshot, None).await
    }

    pub async fn clear_snapshot(&self) -> Result<(), StorageError> {
        self.store.remove(StorageKey::TimerSnapshot).await
    }

    /// The countdown reached zero in the foreground: nothing left to remind
    /// about or recover.
    pub async fn on_timer_finished(&self) -> Result<(), CoreError> {
        self.notifier.cancel_all().await?;
        self.clear_snapshot().await?;
        Ok(())
    }

    /// Reconcile and clear the stored snapshot. `None` when there was none.
    pub async fn recover(
        &self,
        current_course_id: Option<&str>,
        now: i64,
    ) -> Result<Option<Reconciliation>, CoreError> {
        let Some(snapshot) = self.load_snapshot().await else {
            return Ok(None);
        };
        let outcome = reconcile(&snapshot, current_course_id, now);
        self.notifier.cancel_all().await?;
        self.clear_snapshot().await?;
        tracing::info!(?outcome, "snapshot reconciled");
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovery(store: &Store) -> (Recovery, Arc<LogNotifier>) {
        let notifier = Arc::new(LogNotifier::default());
        let recovery = Recovery::new(store.clone(), notifier.clone(), NotificationsConfig::default());
        (recovery, notifier)
    }

    fn running_focus() -> Option<TimerSnapshot> {
        Some(TimerSnapshot {
            mode: SnapshotMode::Focus,
            remaining_ms: 90_000,
            course_id: Some("c1".into()),
            saved_at: 0,
        })
    }

    #[tokio::test]
    async fn inactive_saves_snapshot_and_schedules_notification() {
        let store = Store::memory();
        let (mut recovery, notifier) = recovery(&store);
        recovery.snapshot(running_focus);

        let saved = recovery
            .on_visibility_change(Visibility::Inactive, 5_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.saved_at, 5_000);
        assert_eq!(recovery.load_snapshot().await, Some(saved));

        let pending = notifier.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ms_from_now, 90_000);
        assert_eq!(pending[0].title, NotificationsConfig::default().focus_title);

        recovery
            .on_visibility_change(Visibility::Active, 6_000)
            .await
            .unwrap();
        assert!(notifier.pending().await.is_empty());
        assert!(recovery.load_snapshot().await.is_some());
    }

    #[tokio::test]
    async fn inactive_without_running_timer_stores_nothing() {
        let store = Store::memory();
        let (mut recovery, notifier) = recovery(&store);
        assert!(recovery
            .on_visibility_change(Visibility::Inactive, 1)
            .await
            .unwrap()
            .is_none());
        recovery.snapshot(|| None);
        assert!(recovery
            .on_visibility_change(Visibility::Inactive, 2)
            .await
            .unwrap()
            .is_none());
        assert!(!store.exists(StorageKey::TimerSnapshot).await);
        assert!(notifier.pending().await.is_empty());
    }

    #[tokio::test]
    async fn recover_reconciles_once_and_clears() {
        let store = Store::memory();
        let (mut recovery, _) = recovery(&store);
        recovery.snapshot(running_focus);
        recovery
            .on_visibility_change(Visibility::Inactive, 0)
            .await
            .unwrap();

        let outcome = recovery.recover(Some("c1"), 30_000).await.unwrap();
        assert_eq!(
            outcome,
            Some(Reconciliation::Resume {
                mode: SnapshotMode::Focus,
                remaining_ms: 60_000,
            })
        );
        assert_eq!(recovery.recover(Some("c1"), 30_000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn finishing_in_foreground_clears_everything() {
        let store = Store::memory();
        let (mut recovery, notifier) = recovery(&store);
        recovery.snapshot(running_focus);
        recovery
            .on_visibility_change(Visibility::Inactive, 0)
            .await
            .unwrap();
        recovery.on_timer_finished().await.unwrap();
        assert!(recovery.load_snapshot().await.is_none());
        assert!(notifier.pending().await.is_empty());
    }
}
