//! End-to-end dashboard flow.
//!
//! This test file verifies:
//! - The add -> score -> view -> persist round trip
//! - Backup export/import with derived-field convergence
//! - The periodic driver keeping time-decayed fields fresh
//! - A focus session feeding progress back into the collection

use chrono::{DateTime, Duration, Utc};

use deadlineiq_core::{
    AppState, AssignmentDraft, AssignmentStatus, AssignmentStore, BackupDocument, BackupSettings,
    Database, FocusDurations, FocusTimer, PriorityLevel, RefreshDriver, ReminderEngine, ViewQuery,
    WeekView,
};

fn now() -> DateTime<Utc> {
    "2026-03-02T12:00:00Z".parse().unwrap()
}

fn draft(name: &str, class_name: &str, due_in_hours: i64, grade_weight: f64) -> AssignmentDraft {
    AssignmentDraft {
        name: name.into(),
        class_name: class_name.into(),
        due_date: now() + Duration::hours(due_in_hours),
        grade_weight,
        estimated_hours: 10.0,
        current_grade: 80.0,
        notes: None,
    }
}

#[test]
fn add_score_view_and_persist() {
    let now = now();
    let mut state = AppState::new(now);
    let urgent = state.add(draft("Physics lab", "PHYS 121", 20, 30.0), now).unwrap();
    state.add(draft("Essay outline", "ENGL 102", 300, 10.0), now).unwrap();

    // Reference scenario: 20h out, weight 30, 10h estimate, grade 80 -> 63.
    let scored = state.get(urgent).unwrap();
    assert_eq!(scored.priority_score, 63);
    assert_eq!(scored.priority_level, PriorityLevel::High);

    let query = ViewQuery::default();
    let listing = deadlineiq_core::views::priority_view(state.assignments(), &query);
    assert_eq!(listing[0].id, urgent);

    match deadlineiq_core::views::week_view(state.assignments(), &query, now) {
        WeekView::Due(items) => assert_eq!(items.len(), 1),
        WeekView::NothingDue => panic!("the lab is due this week"),
    }

    // Flush to storage and reload into a fresh state.
    let mut db = Database::open_memory().unwrap();
    db.save(state.assignments()).unwrap();
    let mut reloaded = AppState::new(now);
    reloaded.load(db.load().unwrap(), now);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get(urgent).unwrap().priority_score, 63);
}

#[test]
fn backup_round_trip_replaces_collection_atomically() {
    let now = now();
    let mut state = AppState::new(now);
    state.add(draft("Problem set", "MATH 210", 40, 25.0), now).unwrap();
    state.add(draft("Reading", "HIST 101", 90, 5.0), now).unwrap();

    let doc = BackupDocument::new(
        state.assignments().to_vec(),
        BackupSettings::default(),
        now,
    );
    let json = doc.to_json().unwrap();

    let parsed = BackupDocument::from_json(&json).unwrap();
    let mut restored = AppState::new(now);
    restored.replace_all(parsed.assignments, now);
    assert_eq!(restored.len(), 2);
    for (a, b) in state.assignments().iter().zip(restored.assignments()) {
        assert_eq!(a, b);
    }

    // A bad document never touches the live collection.
    assert!(BackupDocument::from_json(r#"{"version":"1.0"}"#).is_err());
    assert_eq!(restored.len(), 2);
}

#[test]
fn periodic_driver_decays_urgency_over_time() {
    let now = now();
    let mut state = AppState::new(now);
    let id = state.add(draft("Quiz prep", "CSE 340", 26, 20.0), now).unwrap();

    let mut driver = RefreshDriver::new(60);
    driver.force(&mut state, now);
    let before = state.get(id).unwrap().priority_score;

    // Three hours later the record crosses the 24h urgency boundary.
    let later = now + Duration::hours(3);
    assert!(driver.tick(&mut state, later));
    let after = state.get(id).unwrap();
    assert!(after.priority_score > before);
    assert!(after.hours_until_due < 24.0);
}

#[test]
fn reminders_fire_once_per_hour_for_due_work() {
    let now = now();
    let mut state = AppState::new(now);
    state.add(draft("Due tonight", "CSE 340", 6, 20.0), now).unwrap();
    state.add(draft("Far away", "CSE 340", 600, 20.0), now).unwrap();

    let mut reminders = ReminderEngine::new(true);
    let due = reminders.due_reminders(state.assignments(), now);
    assert_eq!(due.len(), 1);
    assert!(due[0].body.starts_with("Due today!"));

    // Within the hour, silence; after it, the band re-fires.
    assert!(reminders
        .due_reminders(state.assignments(), now + Duration::minutes(10))
        .is_empty());
    assert_eq!(
        reminders
            .due_reminders(state.assignments(), now + Duration::hours(1))
            .len(),
        1
    );
}

#[test]
fn focus_session_bumps_linked_assignment_progress() {
    let now = now();
    let mut state = AppState::new(now);
    let id = state.add(draft("Big project", "CSE 340", 100, 40.0), now).unwrap();
    state.set_status(id, AssignmentStatus::InProgress, now).unwrap();
    let before = state.get(id).unwrap().progress;

    let mut timer = FocusTimer::new(FocusDurations::default());
    timer.link_assignment(Some(id));
    timer.start(now);
    let end = timer
        .tick(now + Duration::minutes(25))
        .unwrap_or_else(|| panic!("work session should complete"));

    if let Some(linked) = end.progress_bump {
        state
            .bump_progress(linked, deadlineiq_core::focus::PROGRESS_PER_SESSION, now)
            .unwrap();
    }
    assert_eq!(state.get(id).unwrap().progress, before + 10.0);
}

#[test]
fn settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deadlineiq.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.set_current_view(deadlineiq_core::ViewMode::Class).unwrap();
        db.set_show_completed(false).unwrap();
    }
    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.current_view().unwrap(), deadlineiq_core::ViewMode::Class);
    assert!(!db.show_completed().unwrap());
}
