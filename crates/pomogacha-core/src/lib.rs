//! # Pomogacha Core Library
//!
//! Business logic for Pomogacha, a focus timer that pays out a collectible
//! sushi for every finished focus session. The CLI binary and any other
//! front end are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Storage**: typed JSON key-value store over SQLite (or memory), plus
//!   the TOML process configuration and the user's settings
//! - **Timer**: a tick-driven countdown state machine and a tokio driver
//!   that ticks it on a fixed cadence
//! - **Reward**: weighted-rarity tier pick followed by a uniform item pick
//! - **Course**: the course record, its persistence, and the state machine
//!   sequencing focus, reward and break
//! - **Recovery**: timer snapshots taken when the app goes inactive and
//!   reconciled against the wall clock when it returns
//!
//! ## Key Components
//!
//! - [`Session`]: wires everything together
//! - [`CourseFlow`]: course state machine
//! - [`RewardEngine`]: reward draws
//! - [`TimerDriver`]: async countdown
//! - [`Store`]: persistence handle

pub mod acquisition;
pub mod catalog;
pub mod course;
pub mod error;
pub mod events;
pub mod recovery;
pub mod reward;
pub mod session;
pub mod storage;
pub mod time;
pub mod timer;

pub use acquisition::{AcquisitionEntry, AcquisitionLog};
pub use catalog::{Catalog, Category, Rarity, RewardItem};
pub use course::{Course, CourseBook, CourseFlow, CourseItem, CoursePlan, CourseSummary, Phase};
pub use error::{ConfigError, CoreError, RewardError, StorageError, ValidationError};
pub use events::Event;
pub use recovery::{Notifier, Reconciliation, Recovery, SnapshotMode, TimerSnapshot, Visibility};
pub use reward::{Draw, RarityWeights, RewardEngine};
pub use session::{RecoveryReport, Session};
pub use storage::{AppSettings, Config, Database, SettingsPatch, StorageKey, Store};
pub use timer::{Countdown, TimerDriver, TimerState};
