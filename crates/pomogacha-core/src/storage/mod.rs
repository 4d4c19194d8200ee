//! Persistence: a typed JSON key-value store over pluggable backends.
//!
//! Values are stored as JSON text under a fixed set of logical keys.
//! Reads never fail: a missing, unreadable or corrupt value yields the
//! caller's fallback. Writes are awaited and report errors.

mod config;
pub mod database;
mod settings;

pub use config::{Config, LogConfig, NotificationsConfig, RewardConfig, StorageConfig, TimerConfig};
pub use database::{Database, MemoryBackend};
pub use settings::{AppSettings, SettingsPatch, SettingsStore};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StorageError};

/// Returns the data directory.
///
/// `POMOGACHA_HOME` wins when set. Otherwise `~/.config/pomogacha`, or
/// `~/.config/pomogacha-dev` with `POMOGACHA_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POMOGACHA_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOGACHA_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomogacha-dev")
            } else {
                base_dir.join("pomogacha")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Logical storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AppSettings,
    CurrentCourse,
    CourseHistory,
    AcquisitionLog,
    TimerSnapshot,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::AppSettings,
        StorageKey::CurrentCourse,
        StorageKey::CourseHistory,
        StorageKey::AcquisitionLog,
        StorageKey::TimerSnapshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AppSettings => "app.settings",
            StorageKey::CurrentCourse => "currentCourse",
            StorageKey::CourseHistory => "courseHistory",
            StorageKey::AcquisitionLog => "food.acquisitions",
            StorageKey::TimerSnapshot => "snapshot",
        }
    }
}

/// Raw text storage. Implemented by [`Database`] and [`MemoryBackend`].
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Cloneable handle shared by every component that persists state.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KvBackend>,
}

impl Store {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Decode the value under `key`, or return `fallback`.
    pub async fn load<T: DeserializeOwned>(&self, key: StorageKey, fallback: T) -> T {
        let raw = match self.backend.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "read failed, using fallback");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "corrupt value, using fallback");
                fallback
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Encode {
            key: key.as_str().to_string(),
            message: e.to_string(),
        })?;
        self.backend.set(key.as_str(), &raw).await
    }

    /// Read-modify-write. The previous value falls back like `load`.
    pub async fn update<T, F>(&self, key: StorageKey, fallback: T, f: F) -> Result<T, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let prev = self.load(key, fallback).await;
        let next = f(prev);
        self.save(key, &next).await?;
        Ok(next)
    }

    pub async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.backend.delete(key.as_str()).await
    }

    pub async fn exists(&self, key: StorageKey) -> bool {
        matches!(self.backend.get(key.as_str()).await, Ok(Some(_)))
    }
}
