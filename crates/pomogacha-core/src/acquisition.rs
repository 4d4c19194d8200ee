//! Global log of every reward ever drawn.
//!
//! Append-only; the only way to shrink it is [`AcquisitionLog::clear`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{StorageKey, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionEntry {
    pub item_id: String,
    pub acquired_at: i64,
}

pub struct AcquisitionLog {
    store: Store,
    entries: Vec<AcquisitionEntry>,
}

impl AcquisitionLog {
    pub async fn load(store: Store) -> Self {
        let entries = store.load(StorageKey::AcquisitionLog, Vec::new()).await;
        Self { store, entries }
    }

    pub fn entries(&self) -> &[AcquisitionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one entry and persist the whole log.
    pub async fn record(
        &mut self,
        item_id: &str,
        acquired_at: i64,
    ) -> Result<AcquisitionEntry, StorageError> {
        let entry = AcquisitionEntry {
            item_id: item_id.to_string(),
            acquired_at,
        };
        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.store.save(StorageKey::AcquisitionLog, &next).await?;
        tracing::debug!(item_id, acquired_at, "acquisition recorded");
        self.entries = next;
        Ok(entry)
    }

    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(StorageKey::AcquisitionLog).await?;
        tracing::info!(removed = self.entries.len(), "acquisition log cleared");
        self.entries.clear();
        Ok(())
    }

    pub fn owned_ids(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.item_id.as_str()).collect()
    }

    pub fn count_for(&self, item_id: &str) -> usize {
        self.entries.iter().filter(|e| e.item_id == item_id).count()
    }

    /// Entries grouped by local calendar day, each day in time order.
    pub fn by_day(&self) -> BTreeMap<NaiveDate, Vec<AcquisitionEntry>> {
        self.by_day_in(&Local)
    }

    pub fn by_day_in<Tz: TimeZone>(&self, tz: &Tz) -> BTreeMap<NaiveDate, Vec<AcquisitionEntry>> {
        let mut days: BTreeMap<NaiveDate, Vec<AcquisitionEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let Some(at) = tz.timestamp_millis_opt(entry.acquired_at).single() else {
                tracing::warn!(acquired_at = entry.acquired_at, "timestamp out of range, skipped");
                continue;
            };
            days.entry(at.date_naive()).or_default().push(entry.clone());
        }
        for entries in days.values_mut() {
            entries.sort_by_key(|e| e.acquired_at);
        }
        days
    }
}
