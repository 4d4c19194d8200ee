use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// One reward attached to a course, in acquisition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseItem {
    pub item_id: String,
    pub acquired_at: i64,
}

/// Parameters for a new course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePlan {
    pub planned_sessions: u32,
    pub focus_ms: u64,
    pub break_ms: u64,
}

impl CoursePlan {
    pub fn new(planned_sessions: u32, focus_ms: u64, break_ms: u64) -> Self {
        Self {
            planned_sessions,
            focus_ms,
            break_ms,
        }
    }

    /// Zero-length focus or break is allowed; only the session count is
    /// bounded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.planned_sessions == 0 {
            return Err(ValidationError::InvalidValue {
                field: "plannedSessions".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// A run of consecutive focus sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub started_at: i64,
    pub planned_sessions: u32,
    pub completed_sessions: u32,
    pub focus_ms: u64,
    pub break_ms: u64,
    #[serde(default)]
    pub items: Vec<CourseItem>,
}

impl Course {
    /// Fresh course with a random id. The plan is assumed validated.
    pub fn new(plan: CoursePlan, started_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at,
            planned_sessions: plan.planned_sessions,
            completed_sessions: 0,
            focus_ms: plan.focus_ms,
            break_ms: plan.break_ms,
            items: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed_sessions >= self.planned_sessions
    }

    pub fn remaining_sessions(&self) -> u32 {
        self.planned_sessions.saturating_sub(self.completed_sessions)
    }

    /// 1-based number of the focus session that would run next.
    pub fn next_session_number(&self) -> u32 {
        self.completed_sessions.saturating_add(1)
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            course_id: self.id.clone(),
            started_at: self.started_at,
            planned_sessions: self.planned_sessions,
            completed_sessions: self.completed_sessions,
            items: self.items.clone(),
            finished: self.is_finished(),
        }
    }
}

/// What the user sees when a course is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: String,
    pub started_at: i64,
    pub planned_sessions: u32,
    pub completed_sessions: u32,
    pub items: Vec<CourseItem>,
    pub finished: bool,
}
