//! Integration tests for backgrounding and restart recovery.
//!
//! Each test suspends one `Session`, drops it, and resumes a fresh one on the
//! same database, the way a killed and relaunched app would.

use std::sync::Arc;

use pomogacha_core::recovery::LogNotifier;
use pomogacha_core::time::now_ms;
use pomogacha_core::{Config, Database, Phase, Reconciliation, Session, SnapshotMode, Store};

async fn open(db_path: &std::path::Path, notifier: Arc<LogNotifier>) -> Session {
    let mut config = Config::default();
    config.reward.seed = Some(99);
    let store = Store::new(Database::open_at(db_path).unwrap());
    Session::open(config, store, notifier).await.unwrap()
}

#[tokio::test]
async fn test_focus_finished_while_killed_is_rewarded_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("kv.db");
    let saved_at = {
        let notifier = Arc::new(LogNotifier::default());
        let mut session = open(&db, notifier.clone()).await;
        session.start_course(2, Some(120_000), Some(30_000)).await.unwrap();
        let snapshot = session
            .suspend(SnapshotMode::Focus, 45_000)
            .await
            .unwrap()
            .unwrap();
        let pending = notifier.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ms_from_now, 45_000);
        snapshot.saved_at
    };

    let mut session = open(&db, Arc::new(LogNotifier::default())).await;
    assert_eq!(session.flow().phase(), Phase::Focusing);
    let report = session.resume_at(saved_at + 3_600_000).await.unwrap();
    assert!(matches!(
        report.reconciliation,
        Some(Reconciliation::Elapsed { mode: SnapshotMode::Focus, .. })
    ));
    assert!(report.reward.is_some());
    assert_eq!(report.phase, Phase::Rewarded);

    let course = session.flow().course().unwrap();
    assert_eq!(course.completed_sessions, 1);
    assert_eq!(course.items[0].acquired_at, saved_at + 45_000);
    assert!(session.recovery().load_snapshot().await.is_none());
}

#[tokio::test]
async fn test_running_focus_resumes_with_remaining_time() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("kv.db");
    let saved_at = {
        let mut session = open(&db, Arc::new(LogNotifier::default())).await;
        session.start_course(1, Some(1_500_000), Some(300_000)).await.unwrap();
        session
            .suspend(SnapshotMode::Focus, 1_000_000)
            .await
            .unwrap()
            .unwrap()
            .saved_at
    };

    let mut session = open(&db, Arc::new(LogNotifier::default())).await;
    let report = session.resume_at(saved_at + 400_000).await.unwrap();
    assert_eq!(
        report.reconciliation,
        Some(Reconciliation::Resume {
            mode: SnapshotMode::Focus,
            remaining_ms: 600_000,
        })
    );
    assert!(report.reward.is_none());
    assert_eq!(report.phase, Phase::Focusing);
    assert_eq!(session.flow().course().unwrap().completed_sessions, 0);
}

#[tokio::test]
async fn test_snapshot_after_course_end_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("kv.db");
    let mut session = open(&db, Arc::new(LogNotifier::default())).await;
    session.start_course(2, Some(60_000), Some(30_000)).await.unwrap();
    session.suspend(SnapshotMode::Focus, 30_000).await.unwrap();

    // End the course underneath the session so the stored snapshot goes stale.
    session.flow_mut().end_course(now_ms()).await.unwrap();
    let report = session.resume().await.unwrap();
    assert!(matches!(
        report.reconciliation,
        Some(Reconciliation::Discard { .. })
    ));
    assert_eq!(report.phase, Phase::NoCourse);
    assert!(session.flow().log().is_empty());
}

#[tokio::test]
async fn test_finished_course_never_restarts_focus_on_resume() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("kv.db");
    let mut session = open(&db, Arc::new(LogNotifier::default())).await;
    session.start_course(1, Some(60_000), Some(30_000)).await.unwrap();
    session.complete_focus().await.unwrap();
    session.suspend(SnapshotMode::Break, 1_000).await.unwrap();

    let report = session.resume_at(now_ms() + 60_000).await.unwrap();
    assert_eq!(report.phase, Phase::Finished);
    assert!(report.events.is_empty());
    assert!(session.next_focus().is_err());
}
