//! View aggregation: turns the scored collection into the ordered, grouped
//! projection one of the five view modes presents.
//!
//! All functions here are read-only over the record slice and return borrowed
//! views into it. Day boundaries are taken in the caller-supplied fixed
//! offset so grouping is deterministic under test.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::priority::PriorityLevel;

/// The five presentation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Priority,
    Timeline,
    Calendar,
    Class,
    Week,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Priority => "priority",
            ViewMode::Timeline => "timeline",
            ViewMode::Calendar => "calendar",
            ViewMode::Class => "class",
            ViewMode::Week => "week",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "priority" => Some(ViewMode::Priority),
            "timeline" => Some(ViewMode::Timeline),
            "calendar" => Some(ViewMode::Calendar),
            "class" => Some(ViewMode::Class),
            "week" => Some(ViewMode::Week),
            _ => None,
        }
    }
}

/// Filter and visibility state a projection is computed under.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    /// Case-insensitive substring match against name, class name, and notes.
    pub search: String,
    /// `None` means all tiers.
    pub level_filter: Option<PriorityLevel>,
    pub show_completed: bool,
    /// Offset used for local-day boundaries in timeline/calendar grouping.
    pub offset: FixedOffset,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            level_filter: None,
            show_completed: true,
            offset: Utc.fix(),
        }
    }
}

impl ViewQuery {
    fn matches(&self, a: &Assignment) -> bool {
        if !self.search.is_empty() && !a.matches_search(&self.search) {
            return false;
        }
        match self.level_filter {
            Some(level) => a.priority_level == level,
            None => true,
        }
    }

    /// Completed-visibility pre-filter followed by search and tier filter,
    /// the order every mode except week view uses.
    fn visible<'a>(&self, records: &'a [Assignment]) -> Vec<&'a Assignment> {
        records
            .iter()
            .filter(|a| self.show_completed || !a.is_completed())
            .filter(|a| self.matches(a))
            .collect()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

/// Completed records sort last; within each bucket, descending score.
fn sort_completed_last(items: &mut [&Assignment]) {
    items.sort_by(|a, b| {
        a.is_completed()
            .cmp(&b.is_completed())
            .then(b.priority_score.cmp(&a.priority_score))
    });
}

fn sort_score_desc(items: &mut [&Assignment]) {
    items.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
}

/// Priority view: flat, completed-last, score-descending.
pub fn priority_view<'a>(records: &'a [Assignment], query: &ViewQuery) -> Vec<&'a Assignment> {
    let mut items = query.visible(records);
    sort_completed_last(&mut items);
    items
}

/// Relation of a timeline group's day to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRelation {
    Today,
    Tomorrow,
    Other,
}

/// One calendar day of the timeline view.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub relation: DayRelation,
    pub assignments: Vec<&'a Assignment>,
}

/// Timeline view: grouped by local due-date day, days ascending, score
/// descending within a day.
pub fn timeline_view<'a>(
    records: &'a [Assignment],
    query: &ViewQuery,
    now: DateTime<Utc>,
) -> Vec<DayGroup<'a>> {
    let today = query.local_date(now);
    let tomorrow = today + Duration::days(1);

    let mut items = query.visible(records);
    items.sort_by_key(|a| a.due_date);

    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    for a in items {
        let date = query.local_date(a.due_date);
        match groups.last_mut() {
            Some(group) if group.date == date => group.assignments.push(a),
            _ => groups.push(DayGroup {
                date,
                relation: if date == today {
                    DayRelation::Today
                } else if date == tomorrow {
                    DayRelation::Tomorrow
                } else {
                    DayRelation::Other
                },
                assignments: vec![a],
            }),
        }
    }
    for group in &mut groups {
        sort_score_desc(&mut group.assignments);
    }
    groups
}

/// Per-day cell counts for the calendar view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarDay {
    /// Non-completed records in the critical tier.
    pub critical: usize,
    /// Non-completed records in the high tier.
    pub high: usize,
    pub completed: usize,
    pub total: usize,
}

/// One month of calendar cells, indexed by day-of-month starting at 1.
#[derive(Debug)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn day(&self, day_of_month: u32) -> Option<&CalendarDay> {
        self.days.get(day_of_month as usize - 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// Calendar view for one navigable (month, year) pair, month 1-12.
pub fn calendar_view(
    records: &[Assignment],
    query: &ViewQuery,
    month: u32,
    year: i32,
) -> CalendarMonth {
    let mut days = vec![CalendarDay::default(); days_in_month(year, month) as usize];
    for a in query.visible(records) {
        let due = query.local_date(a.due_date);
        if due.month() != month || due.year() != year {
            continue;
        }
        let cell = &mut days[due.day() as usize - 1];
        cell.total += 1;
        if a.is_completed() {
            cell.completed += 1;
        } else if a.priority_level == PriorityLevel::Critical {
            cell.critical += 1;
        } else if a.priority_level == PriorityLevel::High {
            cell.high += 1;
        }
    }
    CalendarMonth { month, year, days }
}

/// One class grouping of the class view.
#[derive(Debug)]
pub struct ClassGroup<'a> {
    pub class_name: String,
    /// Critical-tier count over the whole group, completed or not.
    pub critical_count: usize,
    pub assignments: Vec<&'a Assignment>,
}

/// Class view: groups alphabetical by class name, score descending within.
pub fn class_view<'a>(records: &'a [Assignment], query: &ViewQuery) -> Vec<ClassGroup<'a>> {
    let mut items = query.visible(records);
    items.sort_by(|a, b| a.class_name.cmp(&b.class_name));

    let mut groups: Vec<ClassGroup<'a>> = Vec::new();
    for a in items {
        match groups.last_mut() {
            Some(group) if group.class_name == a.class_name => group.assignments.push(a),
            _ => groups.push(ClassGroup {
                class_name: a.class_name.clone(),
                critical_count: 0,
                assignments: vec![a],
            }),
        }
    }
    for group in &mut groups {
        group.critical_count = group
            .assignments
            .iter()
            .filter(|a| a.priority_level == PriorityLevel::Critical)
            .count();
        sort_score_desc(&mut group.assignments);
    }
    groups
}

/// Week view result. An empty week is a distinct signal, not just an empty
/// list, so the presentation layer can show its own "nothing due" state.
#[derive(Debug)]
pub enum WeekView<'a> {
    NothingDue,
    Due(Vec<&'a Assignment>),
}

/// Week view: records due within the next 7 days (inclusive at exactly
/// 7x24h), completed-last and score-descending.
///
/// Unlike the other modes this re-derives the completed-visibility check
/// inside its own window filter instead of using the shared pre-filter.
/// Longstanding behavior, kept as is.
pub fn week_view<'a>(
    records: &'a [Assignment],
    query: &ViewQuery,
    now: DateTime<Utc>,
) -> WeekView<'a> {
    let horizon = now + Duration::hours(7 * 24);
    let mut items: Vec<&Assignment> = records
        .iter()
        .filter(|a| query.matches(a))
        .filter(|a| a.due_date <= horizon && (query.show_completed || !a.is_completed()))
        .collect();
    if items.is_empty() {
        return WeekView::NothingDue;
    }
    sort_completed_last(&mut items);
    WeekView::Due(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{AssignmentDraft, AssignmentStatus};
    use crate::priority::PriorityEngine;

    fn scored(
        name: &str,
        class_name: &str,
        now: DateTime<Utc>,
        due_in_hours: i64,
        grade_weight: f64,
        status: AssignmentStatus,
    ) -> Assignment {
        let draft = AssignmentDraft {
            name: name.into(),
            class_name: class_name.into(),
            due_date: now + Duration::hours(due_in_hours),
            grade_weight,
            estimated_hours: 3.0,
            current_grade: 80.0,
            notes: None,
        };
        let mut a = draft.into_assignment(now.timestamp_millis() + due_in_hours);
        a.set_status(status, now);
        let outcome = PriorityEngine::new().score(&a, now);
        a.apply(outcome);
        a
    }

    fn fixed_now() -> DateTime<Utc> {
        // Midday keeps local-day grouping stable at UTC offset.
        "2026-03-02T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn priority_view_sorts_completed_last() {
        let now = fixed_now();
        let records = vec![
            scored("Done", "A", now, 10, 90.0, AssignmentStatus::Completed),
            scored("Low", "A", now, 300, 5.0, AssignmentStatus::NotStarted),
            scored("Urgent", "A", now, 10, 90.0, AssignmentStatus::NotStarted),
        ];
        let view = priority_view(&records, &ViewQuery::default());
        let names: Vec<&str> = view.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Urgent", "Low", "Done"]);
    }

    #[test]
    fn hidden_completed_records_drop_from_priority_view() {
        let now = fixed_now();
        let records = vec![
            scored("Done", "A", now, 10, 90.0, AssignmentStatus::Completed),
            scored("Open", "A", now, 10, 90.0, AssignmentStatus::NotStarted),
        ];
        let query = ViewQuery {
            show_completed: false,
            ..ViewQuery::default()
        };
        let view = priority_view(&records, &query);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "Open");
    }

    #[test]
    fn search_matches_name_class_and_notes() {
        let now = fixed_now();
        let mut with_notes = scored("Essay", "HIST 101", now, 40, 20.0, AssignmentStatus::NotStarted);
        with_notes.notes = Some("peer review draft".into());
        let records = vec![
            with_notes,
            scored("Problem Set", "MATH 210", now, 40, 20.0, AssignmentStatus::NotStarted),
        ];

        let by_notes = ViewQuery {
            search: "REVIEW".into(),
            ..ViewQuery::default()
        };
        assert_eq!(priority_view(&records, &by_notes).len(), 1);

        let by_class = ViewQuery {
            search: "math".into(),
            ..ViewQuery::default()
        };
        assert_eq!(priority_view(&records, &by_class)[0].name, "Problem Set");
    }

    #[test]
    fn tier_filter_keeps_one_level() {
        let now = fixed_now();
        let records = vec![
            scored("Urgent", "A", now, 5, 90.0, AssignmentStatus::NotStarted),
            scored("Far", "A", now, 500, 5.0, AssignmentStatus::NotStarted),
        ];
        let query = ViewQuery {
            level_filter: Some(PriorityLevel::Critical),
            ..ViewQuery::default()
        };
        let view = priority_view(&records, &query);
        assert!(view.iter().all(|a| a.priority_level == PriorityLevel::Critical));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn timeline_groups_by_day_with_labels() {
        let now = fixed_now();
        let records = vec![
            scored("Tomorrow", "A", now, 26, 40.0, AssignmentStatus::NotStarted),
            scored("Today big", "A", now, 4, 90.0, AssignmentStatus::NotStarted),
            scored("Today small", "A", now, 5, 5.0, AssignmentStatus::NotStarted),
        ];
        let groups = timeline_view(&records, &ViewQuery::default(), now);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].relation, DayRelation::Today);
        assert_eq!(groups[1].relation, DayRelation::Tomorrow);
        // Score-descending within the day.
        assert_eq!(groups[0].assignments[0].name, "Today big");
        assert!(groups[0].date < groups[1].date);
    }

    #[test]
    fn calendar_counts_split_by_tier_and_completion() {
        let now = fixed_now();
        let records = vec![
            scored("Crit", "A", now, 5, 95.0, AssignmentStatus::NotStarted),
            scored("Crit done", "A", now, 5, 95.0, AssignmentStatus::Completed),
            scored("High", "A", now, 30, 60.0, AssignmentStatus::NotStarted),
        ];
        let month = calendar_view(&records, &ViewQuery::default(), 3, 2026);
        assert_eq!(month.days.len(), 31);
        let today = month.day(2).copied().unwrap();
        assert_eq!(today.critical, 1);
        assert_eq!(today.completed, 1);
        assert_eq!(today.total, 2);
        let wednesday = month.day(3).copied().unwrap();
        assert_eq!(wednesday.high, 1);
    }

    #[test]
    fn class_groups_alphabetical_with_critical_badge() {
        let now = fixed_now();
        let records = vec![
            scored("Lab", "PHYS 121", now, 5, 95.0, AssignmentStatus::NotStarted),
            scored("Essay", "ENGL 102", now, 200, 10.0, AssignmentStatus::NotStarted),
            scored("Quiz done", "PHYS 121", now, 5, 95.0, AssignmentStatus::Completed),
        ];
        let groups = class_view(&records, &ViewQuery::default());
        assert_eq!(groups[0].class_name, "ENGL 102");
        assert_eq!(groups[1].class_name, "PHYS 121");
        // Badge counts critical regardless of completion.
        assert_eq!(groups[1].critical_count, 2);
    }

    #[test]
    fn week_view_window_is_inclusive_at_seven_days() {
        let now = fixed_now();
        let mut exactly = scored("Edge", "A", now, 7 * 24, 40.0, AssignmentStatus::NotStarted);
        exactly.due_date = now + Duration::hours(7 * 24);
        let beyond = scored("Beyond", "A", now, 7 * 24 + 1, 40.0, AssignmentStatus::NotStarted);
        let records = vec![exactly, beyond];
        match week_view(&records, &ViewQuery::default(), now) {
            WeekView::Due(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].name, "Edge");
            }
            WeekView::NothingDue => panic!("expected the edge record"),
        }
    }

    #[test]
    fn week_view_signals_nothing_due() {
        let now = fixed_now();
        let records = vec![scored("Far", "A", now, 400, 40.0, AssignmentStatus::NotStarted)];
        assert!(matches!(
            week_view(&records, &ViewQuery::default(), now),
            WeekView::NothingDue
        ));
    }

    #[test]
    fn week_view_applies_its_own_completed_filter() {
        let now = fixed_now();
        let records = vec![
            scored("Done", "A", now, 10, 40.0, AssignmentStatus::Completed),
            scored("Open", "A", now, 10, 40.0, AssignmentStatus::NotStarted),
        ];
        let hidden = ViewQuery {
            show_completed: false,
            ..ViewQuery::default()
        };
        match week_view(&records, &hidden, now) {
            WeekView::Due(items) => assert_eq!(items.len(), 1),
            WeekView::NothingDue => panic!("open record is due this week"),
        }
    }

    #[test]
    fn overdue_records_stay_in_week_view() {
        let now = fixed_now();
        let records = vec![scored("Late", "A", now, -30, 40.0, AssignmentStatus::NotStarted)];
        assert!(matches!(
            week_view(&records, &ViewQuery::default(), now),
            WeekView::Due(_)
        ));
    }

    #[test]
    fn view_mode_round_trips_through_str() {
        for mode in [
            ViewMode::Priority,
            ViewMode::Timeline,
            ViewMode::Calendar,
            ViewMode::Class,
            ViewMode::Week,
        ] {
            assert_eq!(ViewMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(ViewMode::from_str("weekly"), None);
    }
}
