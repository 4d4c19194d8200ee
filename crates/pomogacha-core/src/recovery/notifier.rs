//! Local notification scheduling.
//!
//! Delivery belongs to the host platform. [`LogNotifier`] stands in for it
//! by logging and remembering what would have been shown.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::CoreError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Schedule a notification `ms_from_now` milliseconds ahead. Returns its id.
    async fn schedule_local(&self, ms_from_now: u64, title: &str, body: &str) -> Result<String, CoreError>;

    async fn cancel_notification(&self, id: &str) -> Result<(), CoreError>;

    async fn cancel_all(&self) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub ms_from_now: u64,
    pub title: String,
    pub body: String,
}

#[derive(Default)]
pub struct LogNotifier {
    scheduled: Mutex<Vec<ScheduledNotification>>,
}

impl LogNotifier {
    pub async fn pending(&self) -> Vec<ScheduledNotification> {
        self.scheduled.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn schedule_local(&self, ms_from_now: u64, title: &str, body: &str) -> Result<String, CoreError> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(%id, ms_from_now, title, "notification scheduled");
        self.scheduled.lock().await.push(ScheduledNotification {
            id: id.clone(),
            ms_from_now,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(id)
    }

    async fn cancel_notification(&self, id: &str) -> Result<(), CoreError> {
        self.scheduled.lock().await.retain(|n| n.id != id);
        tracing::debug!(id, "notification cancelled");
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), CoreError> {
        let mut scheduled = self.scheduled.lock().await;
        if !scheduled.is_empty() {
            tracing::debug!(count = scheduled.len(), "notifications cancelled");
        }
        scheduled.clear();
        Ok(())
    }
}
