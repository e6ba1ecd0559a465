//! Backup export and import.
//!
//! The backup document is JSON with camelCase keys: a version tag, an
//! export timestamp, the full record sequence, and a settings sub-object.
//! Import validates the whole document before anything is applied; a bad
//! document is rejected atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::error::ImportError;
use crate::views::ViewMode;

pub const BACKUP_VERSION: &str = "1.0";

/// Dashboard settings carried alongside the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    pub current_view: ViewMode,
    pub show_completed: bool,
    pub notifications_enabled: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            current_view: ViewMode::Priority,
            show_completed: true,
            notifications_enabled: true,
        }
    }
}

/// The serialized backup document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub assignments: Vec<Assignment>,
    /// Older backups may not carry settings; import tolerates that.
    #[serde(default)]
    pub settings: Option<BackupSettings>,
}

impl BackupDocument {
    pub fn new(
        assignments: Vec<Assignment>,
        settings: BackupSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            export_date: now,
            assignments,
            settings: Some(settings),
        }
    }

    /// Serialize for export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate an imported document.
    ///
    /// The record list must be present and be a sequence, and the version
    /// (when declared) must be one this build understands. Nothing is
    /// applied on failure; the caller only touches live state with a fully
    /// parsed document in hand.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ImportError::Malformed(e.to_string()))?;
        match value.get("assignments") {
            Some(list) if list.is_array() => {}
            _ => return Err(ImportError::MissingAssignments),
        }
        if let Some(version) = value.get("version").and_then(|v| v.as_str()) {
            if version != BACKUP_VERSION {
                return Err(ImportError::UnsupportedVersion(version.to_string()));
            }
        }
        serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))
    }
}
