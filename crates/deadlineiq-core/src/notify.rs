//! Deadline reminders.
//!
//! The engine decides whether and what to notify; actually presenting the
//! notification is the [`Notifier`] collaborator's job. Checks are rate
//! limited to once per hour regardless of how often the driver ticks.

use chrono::{DateTime, Duration, Utc};

use crate::assignment::Assignment;

/// A reminder ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub body: String,
    /// Dedupe tag, stable per assignment, so repeated reminders replace
    /// rather than stack.
    pub tag: String,
    /// Set for the tightest band; the presenter may keep these on screen.
    pub urgent: bool,
}

/// Presentation-side notification sink.
pub trait Notifier {
    fn notify(&self, reminder: &Reminder) -> Result<(), Box<dyn std::error::Error>>;
}

/// Decides which reminders are due. Owns the hourly rate limit.
pub struct ReminderEngine {
    enabled: bool,
    last_check: Option<DateTime<Utc>>,
}

impl ReminderEngine {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_check: None,
        }
    }

    /// Restore the rate-limit anchor persisted from a previous run.
    pub fn with_last_check(enabled: bool, last_check: Option<DateTime<Utc>>) -> Self {
        Self {
            enabled,
            last_check,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Anchor for persistence across runs.
    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.last_check
    }

    /// Reminders for every incomplete record inside a warning band, or
    /// nothing if disabled or checked within the last hour. Advances the
    /// rate-limit anchor when a check actually runs.
    pub fn due_reminders(&mut self, records: &[Assignment], now: DateTime<Utc>) -> Vec<Reminder> {
        if !self.enabled {
            return Vec::new();
        }
        if let Some(last) = self.last_check {
            if now - last < Duration::hours(1) {
                return Vec::new();
            }
        }
        self.last_check = Some(now);

        records
            .iter()
            .filter(|a| !a.is_completed())
            .filter_map(|a| reminder_for(a, now))
            .collect()
    }
}

/// Warning bands: overdue, within 2 hours (urgent), due today, due
/// tomorrow. Anything further out stays quiet.
fn reminder_for(a: &Assignment, now: DateTime<Utc>) -> Option<Reminder> {
    let hours = (a.due_date - now).num_milliseconds() as f64 / 3_600_000.0;
    let body = if hours < 0.0 {
        format!("Overdue! {} was due {} hours ago.", a.name, hours.abs().round())
    } else if hours <= 2.0 {
        format!("Due in {} hours! {}", hours.round(), a.name)
    } else if hours <= 24.0 {
        format!("Due today! {} - {}", a.name, a.class_name)
    } else if hours <= 48.0 {
        format!("Due tomorrow! {} - {}", a.name, a.class_name)
    } else {
        return None;
    };
    Some(Reminder {
        title: "DeadlineIQ Reminder".to_string(),
        body,
        tag: format!("assignment-{}", a.id),
        urgent: hours < 2.0,
    })
}
