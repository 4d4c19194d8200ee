use serde::{Deserialize, Serialize};

/// Which countdown the snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotMode {
    Focus,
    Break,
}

impl SnapshotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotMode::Focus => "FOCUS",
            SnapshotMode::Break => "BREAK",
        }
    }
}

impl std::fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-flight countdown state written when the app goes inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: SnapshotMode,
    pub remaining_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub saved_at: i64,
}

/// What to do with a snapshot found on the way back to the foreground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconciliation {
    /// The countdown is still going; restart it with what is left.
    #[serde(rename_all = "camelCase")]
    Resume { mode: SnapshotMode, remaining_ms: u64 },
    /// The countdown ran out while inactive.
    #[serde(rename_all = "camelCase")]
    Elapsed { mode: SnapshotMode, overdue_ms: u64 },
    /// The snapshot does not belong to the current course.
    Discard { reason: String },
}

/// Decide how a snapshot maps onto the present.
///
/// A clock that went backwards counts as no time elapsed.
pub fn reconcile(snapshot: &TimerSnapshot, current_course_id: Option<&str>, now: i64) -> Reconciliation {
    match (snapshot.course_id.as_deref(), current_course_id) {
        (Some(saved), Some(current)) if saved == current => {}
        (Some(saved), Some(_)) => {
            return Reconciliation::Discard {
                reason: format!("snapshot belongs to course {saved}"),
            }
        }
        (_, None) => {
            return Reconciliation::Discard {
                reason: "no current course".into(),
            }
        }
        (None, Some(_)) => {
            return Reconciliation::Discard {
                reason: "snapshot has no course".into(),
            }
        }
    }

    let elapsed = u64::try_from(now.saturating_sub(snapshot.saved_at)).unwrap_or(0);
    if elapsed >= snapshot.remaining_ms {
        Reconciliation::Elapsed {
            mode: snapshot.mode,
            overdue_ms: elapsed - snapshot.remaining_ms,
        }
    } else {
        Reconciliation::Resume {
            mode: snapshot.mode,
            remaining_ms: snapshot.remaining_ms - elapsed,
        }
    }
}
