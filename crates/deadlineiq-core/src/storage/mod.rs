mod config;
pub mod database;

pub use config::{Config, FocusConfig, NotificationsConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::assignment::Assignment;
use crate::error::StorageError;

/// Persistence seam for the assignment collection.
///
/// Failures are non-fatal at the core boundary: a failed load falls back to
/// an empty collection and a failed save leaves the in-memory state
/// authoritative until the next successful write.
pub trait AssignmentStore {
    fn load(&self) -> Result<Vec<Assignment>, StorageError>;
    fn save(&mut self, records: &[Assignment]) -> Result<(), StorageError>;
}

/// Returns `~/.config/deadlineiq[-dev]/` based on DEADLINEIQ_ENV.
///
/// Set DEADLINEIQ_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DEADLINEIQ_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("deadlineiq-dev")
    } else {
        base_dir.join("deadlineiq")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
