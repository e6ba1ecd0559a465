//! Application state: the in-memory assignment collection plus the view and
//! filter settings that drive aggregation.
//!
//! The collection is single-writer: mutations and recomputation passes go
//! through `&mut self` and therefore never interleave. Every mutation that
//! touches stored fields ends with a full scoring pass so derived fields are
//! never stale relative to the mutation, and the caller flushes to storage
//! afterwards.

use chrono::{DateTime, Datelike, Utc};

use crate::assignment::{Assignment, AssignmentDraft, AssignmentStatus};
use crate::error::{CoreError, Result};
use crate::priority::{PriorityEngine, PriorityLevel};
use crate::views::ViewMode;

/// Owned application state. Not a global: the embedding shell constructs one
/// and passes it by reference to the aggregator and analytics functions.
pub struct AppState {
    assignments: Vec<Assignment>,
    engine: PriorityEngine,
    pub current_view: ViewMode,
    pub show_completed: bool,
    pub search_query: String,
    pub level_filter: Option<PriorityLevel>,
    /// Calendar view navigation, month 1-12.
    pub calendar_month: u32,
    pub calendar_year: i32,
}

impl AppState {
    /// Fresh state with the calendar opened on the month containing `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            assignments: Vec::new(),
            engine: PriorityEngine::new(),
            current_view: ViewMode::Priority,
            show_completed: true,
            search_query: String::new(),
            level_filter: None,
            calendar_month: now.month(),
            calendar_year: now.year(),
        }
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: i64) -> Result<&mut Assignment> {
        self.assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(CoreError::AssignmentNotFound { id })
    }

    /// Replace the collection from persisted storage. Derived fields from
    /// storage are discarded: time has passed and the scoring rules may have
    /// changed, so a full pass runs before the records are usable.
    pub fn load(&mut self, records: Vec<Assignment>, now: DateTime<Utc>) {
        self.assignments = records;
        self.recompute_all(now);
    }

    /// Create a record from a validated draft. Returns the assigned id.
    pub fn add(&mut self, draft: AssignmentDraft, now: DateTime<Utc>) -> Result<i64> {
        let draft = draft.validated()?;
        let id = self.next_id(now);
        self.assignments.push(draft.into_assignment(id));
        self.recompute_all(now);
        Ok(id)
    }

    /// Apply an edit to the user-authored fields. Status, progress, and the
    /// completion timestamp survive the edit untouched.
    pub fn update(&mut self, id: i64, draft: AssignmentDraft, now: DateTime<Utc>) -> Result<()> {
        let draft = draft.validated()?;
        let record = self.get_mut(id)?;
        record.name = draft.name;
        record.class_name = draft.class_name;
        record.due_date = draft.due_date;
        record.grade_weight = draft.grade_weight;
        record.estimated_hours = draft.estimated_hours;
        record.current_grade = draft.current_grade;
        record.notes = draft.notes;
        self.recompute_all(now);
        Ok(())
    }

    pub fn delete(&mut self, id: i64) -> Result<Assignment> {
        let idx = self
            .assignments
            .iter()
            .position(|a| a.id == id)
            .ok_or(CoreError::AssignmentNotFound { id })?;
        Ok(self.assignments.remove(idx))
    }

    pub fn set_status(
        &mut self,
        id: i64,
        status: AssignmentStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.get_mut(id)?.set_status(status, now);
        self.recompute_all(now);
        Ok(())
    }

    pub fn set_progress(&mut self, id: i64, progress: f64, now: DateTime<Utc>) -> Result<()> {
        self.get_mut(id)?.set_progress(progress, now);
        self.recompute_all(now);
        Ok(())
    }

    /// Nudge progress by a delta (used by the focus timer after a completed
    /// work session).
    pub fn bump_progress(&mut self, id: i64, delta: f64, now: DateTime<Utc>) -> Result<()> {
        let current = self.get_mut(id)?.progress;
        self.set_progress(id, current + delta, now)
    }

    /// Bulk-replace on import. The incoming records were already validated
    /// as a whole document; this is atomic by construction.
    pub fn replace_all(&mut self, records: Vec<Assignment>, now: DateTime<Utc>) {
        self.assignments = records;
        self.recompute_all(now);
    }

    /// Re-run the scoring engine over every record at `now`. Idempotent for
    /// a fixed `now`.
    pub fn recompute_all(&mut self, now: DateTime<Utc>) {
        for a in &mut self.assignments {
            let outcome = self.engine.score(a, now);
            a.apply(outcome);
        }
    }

    /// Navigate the calendar view by whole months, wrapping year boundaries.
    pub fn change_month(&mut self, delta: i32) {
        let mut month = self.calendar_month as i32 + delta;
        while month < 1 {
            month += 12;
            self.calendar_year -= 1;
        }
        while month > 12 {
            month -= 12;
            self.calendar_year += 1;
        }
        self.calendar_month = month as u32;
    }

    /// Creation ids are epoch milliseconds, nudged forward on collision so
    /// two records created within the same millisecond stay distinct.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let mut id = now.timestamp_millis();
        while self.assignments.iter().any(|a| a.id == id) {
            id += 1;
        }
        id
    }
}
