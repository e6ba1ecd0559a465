//! # DeadlineIQ Core Library
//!
//! Core logic for the DeadlineIQ assignment dashboard: a priority scoring
//! engine over a student's assignment collection, the view projections that
//! present it, and the analytics derived from it. The presentation shell is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Scoring**: pure and deterministic; every entry point takes an
//!   explicit `now` so nothing here reads the wall clock behind your back
//! - **State**: a single owned [`AppState`] holds the collection; every
//!   mutation ends with a full scoring pass
//! - **Driver**: tick-based recomputation keeps time-decayed urgency fresh,
//!   with an async wrapper for shells that want the cadence handled
//! - **Storage**: SQLite for records and settings, TOML for configuration
//!
//! ## Key Components
//!
//! - [`PriorityEngine`]: record + now -> score, tier, time-remaining fields
//! - [`AppState`]: owned collection plus view/filter state
//! - [`views`]: the five view-mode projections
//! - [`analytics`]: recommendations, time blocks, stress, summary stats
//! - [`Database`] / [`Config`]: persistence and configuration

pub mod analytics;
pub mod assignment;
pub mod backup;
pub mod driver;
pub mod error;
pub mod focus;
pub mod notify;
pub mod priority;
pub mod state;
pub mod storage;
pub mod views;

pub use assignment::{Assignment, AssignmentDraft, AssignmentStatus};
pub use backup::{BackupDocument, BackupSettings, BACKUP_VERSION};
pub use driver::RefreshDriver;
pub use error::{ConfigError, CoreError, ImportError, StorageError, ValidationError};
pub use focus::{FocusDurations, FocusMode, FocusState, FocusStats, FocusTimer};
pub use notify::{Notifier, Reminder, ReminderEngine};
pub use priority::{PriorityEngine, PriorityLevel, PriorityOutcome, PriorityWeights};
pub use state::AppState;
pub use storage::{AssignmentStore, Config, Database};
pub use views::{ViewMode, ViewQuery, WeekView};
