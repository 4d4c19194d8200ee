//! User preferences persisted under `app.settings`.

use serde::{Deserialize, Serialize};

use super::{StorageKey, Store};
use crate::error::StorageError;
use crate::time::minutes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "classic_focus_ms")]
    pub default_focus_ms: u64,
    #[serde(default = "classic_break_ms")]
    pub default_break_ms: u64,
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
}

fn classic_focus_ms() -> u64 {
    minutes(25)
}
fn classic_break_ms() -> u64 {
    minutes(5)
}
fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_focus_ms: classic_focus_ms(),
            default_break_ms: classic_break_ms(),
            vibration: true,
            sound: true,
        }
    }
}

impl AppSettings {
    /// Copy with every field the patch sets replaced.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            default_focus_ms: patch.default_focus_ms.unwrap_or(self.default_focus_ms),
            default_break_ms: patch.default_break_ms.unwrap_or(self.default_break_ms),
            vibration: patch.vibration.unwrap_or(self.vibration),
            sound: patch.sound.unwrap_or(self.sound),
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_focus_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_break_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<bool>,
}

pub struct SettingsStore {
    store: Store,
    settings: AppSettings,
}

impl SettingsStore {
    /// Missing or corrupt settings load as defaults.
    pub async fn load(store: Store) -> Self {
        let settings = store
            .load(StorageKey::AppSettings, AppSettings::default())
            .await;
        Self { store, settings }
    }

    pub fn get(&self) -> &AppSettings {
        &self.settings
    }

    /// Merge, persist, then commit in memory. A failed write leaves the
    /// in-memory settings unchanged.
    pub async fn update(&mut self, patch: &SettingsPatch) -> Result<&AppSettings, StorageError> {
        let next = self.settings.merged(patch);
        self.store.save(StorageKey::AppSettings, &next).await?;
        tracing::debug!(?next, "settings updated");
        self.settings = next;
        Ok(&self.settings)
    }

    pub async fn reset(&mut self) -> Result<&AppSettings, StorageError> {
        let defaults = AppSettings::default();
        self.store.save(StorageKey::AppSettings, &defaults).await?;
        self.settings = defaults;
        Ok(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = AppSettings::default();
        assert_eq!(s.default_focus_ms, 1_500_000);
        assert_eq!(s.default_break_ms, 300_000);
        assert!(s.vibration && s.sound);
    }

    #[test]
    fn persisted_form_is_camel_case() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json["defaultFocusMs"], 1_500_000);
        assert_eq!(json["sound"], true);

        let partial: AppSettings = serde_json::from_str(r#"{"defaultBreakMs":60000}"#).unwrap();
        assert_eq!(partial.default_break_ms, 60_000);
        assert_eq!(partial.default_focus_ms, 1_500_000);
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let store = Store::memory();
        let mut settings = SettingsStore::load(store.clone()).await;
        let patch = SettingsPatch {
            default_focus_ms: Some(minutes(50)),
            sound: Some(false),
            ..Default::default()
        };
        settings.update(&patch).await.unwrap();

        let reloaded = SettingsStore::load(store).await;
        assert_eq!(reloaded.get().default_focus_ms, 3_000_000);
        assert_eq!(reloaded.get().default_break_ms, 300_000);
        assert!(!reloaded.get().sound);
        assert!(reloaded.get().vibration);
    }

    #[tokio::test]
    async fn zero_break_is_a_valid_default() {
        let store = Store::memory();
        let mut settings = SettingsStore::load(store.clone()).await;
        let patch = SettingsPatch {
            default_break_ms: Some(0),
            ..Default::default()
        };
        settings.update(&patch).await.unwrap();
        assert_eq!(SettingsStore::load(store).await.get().default_break_ms, 0);
    }

    #[tokio::test]
    async fn loads_blob_written_in_data_model_shape() {
        let store = Store::memory();
        let blob = serde_json::json!({
            "defaultFocusMs": 3_000_000,
            "defaultBreakMs": 600_000,
            "vibration": false,
            "sound": false,
        });
        store.save(StorageKey::AppSettings, &blob).await.unwrap();

        let loaded = SettingsStore::load(store).await;
        assert_eq!(
            loaded.get(),
            &AppSettings {
                default_focus_ms: 3_000_000,
                default_break_ms: 600_000,
                vibration: false,
                sound: false,
            }
        );
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let store = Store::memory();
        let mut settings = SettingsStore::load(store.clone()).await;
        settings
            .update(&SettingsPatch {
                vibration: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        settings.reset().await.unwrap();
        assert_eq!(SettingsStore::load(store).await.get(), &AppSettings::default());
    }
}
