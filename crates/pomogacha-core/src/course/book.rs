//! The current course and the history of ended ones.
//!
//! Every mutation builds the next value, writes it, and only then replaces
//! the in-memory copy, so a failed write leaves the book as it was. Ending a
//! course takes two writes; the history write is committed on its own so a
//! retry never archives the same course twice.

use serde::Serialize;

use super::model::{Course, CourseItem, CoursePlan, CourseSummary};
use crate::error::CoreError;
use crate::storage::{StorageKey, Store};

/// Result of [`CourseBook::complete_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    NoCourse,
    AlreadyFinished,
    #[serde(rename_all = "camelCase")]
    Recorded {
        completed_sessions: u32,
        planned_sessions: u32,
        finished: bool,
    },
}

pub struct CourseBook {
    store: Store,
    current: Option<Course>,
    history: Vec<Course>,
}

impl CourseBook {
    pub async fn load(store: Store) -> Self {
        let current = store.load(StorageKey::CurrentCourse, None).await;
        let history = store.load(StorageKey::CourseHistory, Vec::new()).await;
        Self {
            store,
            current,
            history,
        }
    }

    pub fn current(&self) -> Option<&Course> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[Course] {
        &self.history
    }

    /// Summary of the most recently ended course.
    pub fn last_summary(&self) -> Option<CourseSummary> {
        self.history.last().map(Course::summary)
    }

    /// Start a new course. An existing current course is ended first.
    pub async fn create_course(&mut self, plan: CoursePlan, now: i64) -> Result<&Course, CoreError> {
        plan.validate()?;
        if let Some(previous) = &self.current {
            tracing::info!(course_id = %previous.id, "archiving current course before starting a new one");
            self.end_course().await?;
        }

        let course = Course::new(plan, now);
        self.store.save(StorageKey::CurrentCourse, &course).await?;
        tracing::info!(
            course_id = %course.id,
            planned_sessions = course.planned_sessions,
            "course created"
        );
        Ok(&*self.current.insert(course))
    }

    /// Count one finished focus session, attaching its reward if any.
    pub async fn complete_session(
        &mut self,
        item: Option<CourseItem>,
    ) -> Result<SessionOutcome, CoreError> {
        let Some(current) = &self.current else {
            tracing::debug!("complete_session without a current course");
            return Ok(SessionOutcome::NoCourse);
        };
        if current.is_finished() {
            tracing::warn!(course_id = %current.id, "course already finished, session not counted");
            return Ok(SessionOutcome::AlreadyFinished);
        }

        let mut next = current.clone();
        next.completed_sessions += 1;
        if let Some(item) = item {
            next.items.push(item);
        }
        self.store.save(StorageKey::CurrentCourse, &next).await?;

        let outcome = SessionOutcome::Recorded {
            completed_sessions: next.completed_sessions,
            planned_sessions: next.planned_sessions,
            finished: next.is_finished(),
        };
        tracing::info!(
            course_id = %next.id,
            completed = next.completed_sessions,
            planned = next.planned_sessions,
            "session completed"
        );
        self.current = Some(next);
        Ok(outcome)
    }

    /// Move the current course into history. `None` when there was nothing to end.
    pub async fn end_course(&mut self) -> Result<Option<CourseSummary>, CoreError> {
        let Some(current) = &self.current else {
            return Ok(None);
        };

        // A retry after a failed slot removal finds the course already archived.
        let archived = self.history.last().is_some_and(|last| last.id == current.id);
        if !archived {
            let mut history = self.history.clone();
            history.push(current.clone());
            self.store.save(StorageKey::CourseHistory, &history).await?;
            self.history = history;
        }
        self.store.remove(StorageKey::CurrentCourse).await?;

        let summary = current.summary();
        tracing::info!(
            course_id = %summary.course_id,
            completed = summary.completed_sessions,
            "course ended"
        );
        self.current = None;
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::{KvBackend, MemoryBackend};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn plan(n: u32) -> CoursePlan {
        CoursePlan::new(n, 1_500_000, 300_000)
    }

    fn item(id: &str, at: i64) -> CourseItem {
        CourseItem {
            item_id: id.into(),
            acquired_at: at,
        }
    }

    #[tokio::test]
    async fn three_session_course_finishes_after_three_completions() {
        let mut book = CourseBook::load(Store::memory()).await;
        book.create_course(plan(3), 0).await.unwrap();

        for n in 1..=3 {
            let outcome = book.complete_session(Some(item("egg", n))).await.unwrap();
            assert_eq!(
                outcome,
                SessionOutcome::Recorded {
                    completed_sessions: n as u32,
                    planned_sessions: 3,
                    finished: n == 3,
                }
            );
        }
        let course = book.current().unwrap();
        assert!(course.is_finished());
        assert_eq!(course.items.len(), 3);
    }

    #[tokio::test]
    async fn complete_without_course_is_a_no_op() {
        let store = Store::memory();
        let mut book = CourseBook::load(store.clone()).await;
        assert_eq!(
            book.complete_session(Some(item("egg", 1))).await.unwrap(),
            SessionOutcome::NoCourse
        );
        assert!(book.current().is_none());
        assert!(!store.exists(StorageKey::CurrentCourse).await);
    }

    #[tokio::test]
    async fn finished_course_does_not_overcount() {
        let mut book = CourseBook::load(Store::memory()).await;
        book.create_course(plan(1), 0).await.unwrap();
        book.complete_session(None).await.unwrap();
        assert_eq!(
            book.complete_session(Some(item("egg", 2))).await.unwrap(),
            SessionOutcome::AlreadyFinished
        );
        let course = book.current().unwrap();
        assert_eq!(course.completed_sessions, 1);
        assert!(course.items.is_empty());
    }

    #[tokio::test]
    async fn end_course_twice_equals_once() {
        let store = Store::memory();
        let mut book = CourseBook::load(store.clone()).await;
        book.create_course(plan(2), 0).await.unwrap();
        book.complete_session(Some(item("tuna", 5))).await.unwrap();

        let summary = book.end_course().await.unwrap().unwrap();
        assert_eq!(summary.completed_sessions, 1);
        assert!(!summary.finished);
        assert!(book.end_course().await.unwrap().is_none());

        assert_eq!(book.history().len(), 1);
        assert!(book.current().is_none());
        assert!(!store.exists(StorageKey::CurrentCourse).await);

        let reloaded = CourseBook::load(store).await;
        assert_eq!(reloaded.history().len(), 1);
        assert_eq!(reloaded.last_summary(), Some(summary));
    }

    #[tokio::test]
    async fn creating_over_a_current_course_archives_it() {
        let mut book = CourseBook::load(Store::memory()).await;
        let first = book.create_course(plan(2), 0).await.unwrap().id.clone();
        let second = book.create_course(plan(4), 1).await.unwrap().id.clone();
        assert_ne!(first, second);
        assert_eq!(book.history().len(), 1);
        assert_eq!(book.history()[0].id, first);
        assert_eq!(book.current().unwrap().planned_sessions, 4);
    }

    #[tokio::test]
    async fn invalid_plan_leaves_book_untouched() {
        let mut book = CourseBook::load(Store::memory()).await;
        book.create_course(plan(2), 0).await.unwrap();
        assert!(book.create_course(plan(0), 1).await.is_err());
        assert_eq!(book.current().unwrap().planned_sessions, 2);
        assert!(book.history().is_empty());
    }

    #[tokio::test]
    async fn zero_length_break_and_focus_are_accepted() {
        let store = Store::memory();
        let mut book = CourseBook::load(store.clone()).await;
        let course = book
            .create_course(CoursePlan::new(3, 1_500_000, 0), 0)
            .await
            .unwrap();
        assert_eq!(course.break_ms, 0);

        let course = book.create_course(CoursePlan::new(1, 0, 300_000), 1).await.unwrap();
        assert_eq!(course.focus_ms, 0);
        assert_eq!(CourseBook::load(store).await.current().unwrap().focus_ms, 0);
    }

    /// Memory backend whose next delete can be made to fail once.
    #[derive(Default)]
    struct FlakyDelete {
        inner: MemoryBackend,
        fail_next_delete: Arc<AtomicBool>,
    }

    #[async_trait]
    impl KvBackend for FlakyDelete {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_next_delete.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Locked);
            }
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn retrying_a_half_finished_end_archives_once() {
        let backend = FlakyDelete::default();
        let fail = backend.fail_next_delete.clone();
        let store = Store::new(backend);
        let mut book = CourseBook::load(store.clone()).await;
        let id = book.create_course(plan(2), 0).await.unwrap().id.clone();

        fail.store(true, Ordering::SeqCst);
        assert!(book.end_course().await.is_err());
        assert!(book.current().is_some());

        let summary = book.end_course().await.unwrap().unwrap();
        assert_eq!(summary.course_id, id);
        assert!(book.current().is_none());
        assert_eq!(book.history().len(), 1);

        let reloaded = CourseBook::load(store).await;
        assert_eq!(reloaded.history().len(), 1);
        assert!(reloaded.current().is_none());
    }

    #[tokio::test]
    async fn current_course_survives_reload() {
        let store = Store::memory();
        let mut book = CourseBook::load(store.clone()).await;
        book.create_course(plan(3), 42).await.unwrap();
        book.complete_session(Some(item("mochi", 43))).await.unwrap();

        let reloaded = CourseBook::load(store).await;
        assert_eq!(reloaded.current(), book.current());
    }

    proptest! {
        #[test]
        fn completed_never_exceeds_planned(planned in 1u32..8, calls in 0usize..20) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let mut book = CourseBook::load(Store::memory()).await;
                book.create_course(plan(planned), 0).await.unwrap();
                for i in 0..calls {
                    let before = book.current().unwrap().completed_sessions;
                    book.complete_session(None).await.unwrap();
                    let after = book.current().unwrap().completed_sessions;
                    if before < planned {
                        prop_assert_eq!(after, before + 1, "call {}", i);
                    } else {
                        prop_assert_eq!(after, before);
                    }
                    prop_assert!(after <= planned);
                }
                Ok(())
            })?;
        }
    }
}
