//! Assignment record types.
//!
//! An [`Assignment`] is the sole persisted entity: user-authored fields plus
//! derived priority fields that are recomputed by the scoring engine and
//! never trusted as-is from storage.
//!
//! Status and progress are equivalent completion signals and always move
//! together: marking a record completed forces progress to 100, and driving
//! progress to 100 marks the record completed. A record can never persist
//! as completed with partial progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::priority::{PriorityLevel, PriorityOutcome};

/// Completion state of an assignment. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::NotStarted => "not_started",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(AssignmentStatus::NotStarted),
            "in_progress" => Some(AssignmentStatus::InProgress),
            "completed" => Some(AssignmentStatus::Completed),
            _ => None,
        }
    }
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        AssignmentStatus::NotStarted
    }
}

/// A tracked assignment.
///
/// Field names serialize in camelCase to match the backup document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Creation-time epoch milliseconds; unique and immutable.
    pub id: i64,
    pub name: String,
    pub class_name: String,
    /// Anchor for all urgency computation.
    pub due_date: DateTime<Utc>,
    /// Percent of the course grade this assignment represents (0-100).
    pub grade_weight: f64,
    /// Student's effort estimate in hours, non-negative.
    pub estimated_hours: f64,
    /// Current course grade, used as a risk proxy (0-100).
    pub current_grade: f64,
    #[serde(default)]
    pub status: AssignmentStatus,
    /// Completion percentage (0-100); meaningful while in progress.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,

    // Derived fields, owned by the scoring engine.
    #[serde(default)]
    pub priority_score: u8,
    #[serde(default)]
    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub hours_until_due: f64,
    #[serde(default)]
    pub days_until_due: f64,
}

impl Assignment {
    pub fn is_completed(&self) -> bool {
        self.status == AssignmentStatus::Completed
    }

    /// Write the scoring engine's output back onto the record. This is the
    /// only way derived fields change.
    pub fn apply(&mut self, outcome: PriorityOutcome) {
        self.priority_score = outcome.priority_score;
        self.priority_level = outcome.priority_level;
        self.hours_until_due = outcome.hours_until_due;
        self.days_until_due = outcome.days_until_due;
    }

    /// Transition to a new status, synchronizing progress and the
    /// completion timestamp in the same change.
    pub fn set_status(&mut self, status: AssignmentStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            AssignmentStatus::Completed => {
                self.progress = 100.0;
                self.completed_at = Some(now);
            }
            AssignmentStatus::InProgress => {
                self.completed_at = None;
                if self.progress == 0.0 {
                    // Starting work implies some progress.
                    self.progress = 25.0;
                }
            }
            AssignmentStatus::NotStarted => {
                self.progress = 0.0;
                self.completed_at = None;
            }
        }
    }

    /// Update progress, clamped to [0,100], synchronizing status both ways:
    /// reaching 100 completes the record, partial progress on a completed
    /// record demotes it back to in-progress.
    pub fn set_progress(&mut self, progress: f64, now: DateTime<Utc>) {
        let progress = progress.clamp(0.0, 100.0);
        self.progress = progress;

        if progress == 100.0 {
            self.status = AssignmentStatus::Completed;
            self.completed_at = Some(now);
        } else if progress > 0.0 {
            if self.status != AssignmentStatus::InProgress {
                self.status = AssignmentStatus::InProgress;
                self.completed_at = None;
            }
        } else if self.status == AssignmentStatus::Completed {
            self.status = AssignmentStatus::InProgress;
            self.completed_at = None;
        }
    }

    /// Case-insensitive substring match against name, class name, and notes.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.class_name.to_lowercase().contains(&needle)
            || self
                .notes
                .as_deref()
                .map(|n| n.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// User input for creating or editing an assignment. Validated before it
/// ever touches the collection; partial records are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub name: String,
    pub class_name: String,
    pub due_date: DateTime<Utc>,
    pub grade_weight: f64,
    pub estimated_hours: f64,
    pub current_grade: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AssignmentDraft {
    /// Validate and normalize the draft. Percent fields clamp to [0,100];
    /// an empty name or class, a negative or non-finite hour estimate, and
    /// non-finite percents are rejected with the offending field named.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name".into()));
        }
        self.class_name = self.class_name.trim().to_string();
        if self.class_name.is_empty() {
            return Err(ValidationError::MissingField("className".into()));
        }
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(ValidationError::invalid(
                "estimatedHours",
                "must be a non-negative number",
            ));
        }
        if !self.grade_weight.is_finite() {
            return Err(ValidationError::invalid("gradeWeight", "must be a number"));
        }
        if !self.current_grade.is_finite() {
            return Err(ValidationError::invalid("currentGrade", "must be a number"));
        }
        self.grade_weight = self.grade_weight.clamp(0.0, 100.0);
        self.current_grade = self.current_grade.clamp(0.0, 100.0);
        self.notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(self)
    }

    /// Build a fresh record from the validated draft. Derived fields start
    /// zeroed; the caller runs a scoring pass before the record is used.
    pub fn into_assignment(self, id: i64) -> Assignment {
        Assignment {
            id,
            name: self.name,
            class_name: self.class_name,
            due_date: self.due_date,
            grade_weight: self.grade_weight,
            estimated_hours: self.estimated_hours,
            current_grade: self.current_grade,
            status: AssignmentStatus::NotStarted,
            progress: 0.0,
            completed_at: None,
            notes: self.notes,
            priority_score: 0,
            priority_level: PriorityLevel::Low,
            hours_until_due: 0.0,
            days_until_due: 0.0,
        }
    }
}
