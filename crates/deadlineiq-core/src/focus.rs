//! Focus timer.
//!
//! A wall-clock state machine with no internal thread: the caller ticks it
//! periodically with an explicit `now` and reacts to the returned session
//! event. Completing a work session can nudge the linked assignment's
//! progress through the application state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Progress added to the linked assignment per completed work session.
pub const PROGRESS_PER_SESSION: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    Work,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    Idle,
    Running,
    Paused,
}

/// Session lengths in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusDurations {
    pub work_min: u64,
    pub short_break_min: u64,
    pub long_break_min: u64,
    /// Every Nth work session is followed by a long break.
    pub sessions_before_long_break: u32,
}

impl Default for FocusDurations {
    fn default() -> Self {
        Self {
            work_min: 25,
            short_break_min: 5,
            long_break_min: 15,
            sessions_before_long_break: 4,
        }
    }
}

impl FocusDurations {
    fn minutes(&self, mode: FocusMode) -> u64 {
        match mode {
            FocusMode::Work => self.work_min,
            FocusMode::ShortBreak => self.short_break_min,
            FocusMode::LongBreak => self.long_break_min,
        }
    }

    fn duration_ms(&self, mode: FocusMode) -> u64 {
        self.minutes(mode) * 60 * 1000
    }
}

/// Persisted focus statistics. The daily counters reset when a session
/// completes on a new calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusStats {
    pub sessions_today: u32,
    pub total_minutes: u64,
    pub current_streak: u32,
    #[serde(default)]
    pub last_session_date: Option<NaiveDate>,
}

/// Emitted when a session runs to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub mode: FocusMode,
    pub minutes: u64,
    /// Linked assignment to bump by [`PROGRESS_PER_SESSION`], set only for
    /// completed work sessions.
    pub progress_bump: Option<i64>,
}

/// Wall-clock focus timer. The caller owns the tick cadence; elapsed time
/// is computed from `now` deltas so a slow or missed tick never loses time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTimer {
    durations: FocusDurations,
    mode: FocusMode,
    state: FocusState,
    /// Remaining time in milliseconds for the current session.
    remaining_ms: u64,
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
    #[serde(default)]
    stats: FocusStats,
    #[serde(default)]
    linked_assignment: Option<i64>,
}

impl FocusTimer {
    pub fn new(durations: FocusDurations) -> Self {
        Self {
            durations,
            mode: FocusMode::Work,
            state: FocusState::Idle,
            remaining_ms: durations.duration_ms(FocusMode::Work),
            last_tick: None,
            stats: FocusStats::default(),
            linked_assignment: None,
        }
    }

    /// Restore with previously persisted stats.
    pub fn with_stats(durations: FocusDurations, stats: FocusStats) -> Self {
        Self {
            stats,
            ..Self::new(durations)
        }
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn stats(&self) -> &FocusStats {
        &self.stats
    }

    pub fn linked_assignment(&self) -> Option<i64> {
        self.linked_assignment
    }

    pub fn link_assignment(&mut self, id: Option<i64>) {
        self.linked_assignment = id;
    }

    /// Switch mode, stopping any running session and resetting the clock.
    pub fn set_mode(&mut self, mode: FocusMode) {
        self.mode = mode;
        self.state = FocusState::Idle;
        self.last_tick = None;
        self.remaining_ms = self.durations.duration_ms(mode);
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        match self.state {
            FocusState::Idle | FocusState::Paused => {
                self.state = FocusState::Running;
                self.last_tick = Some(now);
            }
            FocusState::Running => {}
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.state == FocusState::Running {
            self.flush_elapsed(now);
            self.state = FocusState::Paused;
            self.last_tick = None;
        }
    }

    pub fn reset(&mut self) {
        self.set_mode(self.mode);
    }

    /// Advance the clock. Returns the session event when the current
    /// session runs out.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionEnd> {
        if self.state != FocusState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }
        Some(self.complete_session(now))
    }

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            let elapsed = (now - last).num_milliseconds().max(0) as u64;
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        }
        self.last_tick = Some(now);
    }

    fn complete_session(&mut self, now: DateTime<Utc>) -> SessionEnd {
        let finished = self.mode;
        let today = now.date_naive();

        if self.stats.last_session_date == Some(today) {
            self.stats.sessions_today += 1;
            self.stats.current_streak += 1;
        } else {
            self.stats.sessions_today = 1;
            self.stats.current_streak = 1;
            self.stats.last_session_date = Some(today);
        }
        self.stats.total_minutes += self.durations.minutes(finished);

        let next = match finished {
            FocusMode::Work => {
                if self.stats.sessions_today % self.durations.sessions_before_long_break == 0 {
                    FocusMode::LongBreak
                } else {
                    FocusMode::ShortBreak
                }
            }
            FocusMode::ShortBreak | FocusMode::LongBreak => FocusMode::Work,
        };
        self.set_mode(next);

        SessionEnd {
            mode: finished,
            minutes: self.durations.minutes(finished),
            progress_bump: if finished == FocusMode::Work {
                self.linked_assignment
            } else {
                None
            },
        }
    }
}
