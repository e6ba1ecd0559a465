//! Derived analytics: recommendations, time-block scheduling, stress level,
//! and the dashboard summary numbers.
//!
//! Everything here is a read-only projection over the scored collection.
//! None of these hold state; they re-derive from the records on every call
//! and agree with the views because they read the same derived fields.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};

use crate::assignment::{Assignment, AssignmentStatus};
use crate::priority::PriorityLevel;

fn incomplete_by_score(records: &[Assignment]) -> Vec<&Assignment> {
    let mut items: Vec<&Assignment> = records.iter().filter(|a| !a.is_completed()).collect();
    items.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    items
}

/// One entry of the "what to work on" ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
    pub level: PriorityLevel,
    pub reason: String,
}

/// Top 3 incomplete records by score, each with a rationale keyed off its
/// rank: the top slot stresses imminent deadlines or grade weight, the
/// second stresses effort, the third is framed as a quick win.
pub fn recommendations(
    records: &[Assignment],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<Recommendation> {
    incomplete_by_score(records)
        .into_iter()
        .take(3)
        .enumerate()
        .map(|(rank, a)| {
            let hours = (a.due_date - now).num_milliseconds() as f64 / 3_600_000.0;
            let days = hours / 24.0;
            let reason = match rank {
                0 => {
                    if hours < 24.0 {
                        format!("Due in {} hours! Start immediately.", hours.round())
                    } else if days < 3.0 {
                        format!("Due in {} days. High priority.", days.round())
                    } else {
                        format!("Highest priority. {}% of your grade.", a.grade_weight)
                    }
                }
                1 => {
                    if a.estimated_hours >= 5.0 {
                        format!("Needs {}h to complete. Start early.", a.estimated_hours)
                    } else {
                        format!(
                            "Second priority. Due {}.",
                            a.due_date.with_timezone(&offset).format("%b %d")
                        )
                    }
                }
                _ => format!("Quick win opportunity. {}h estimated.", a.estimated_hours),
            };
            Recommendation {
                id: a.id,
                name: a.name.clone(),
                level: a.priority_level,
                reason,
            }
        })
        .collect()
}

/// A scheduled work block for one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBlock {
    pub id: i64,
    pub name: String,
    pub class_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
}

fn local_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(naive - Duration::seconds(offset.local_minus_utc() as i64)))
}

/// Greedy schedule for the top 4 incomplete records by score.
///
/// Blocks are capped at 3 hours, shortened proportionally by existing
/// progress for in-progress records, separated by 1-hour gaps. The first
/// block anchors at 9:00, 14:00, or 19:00 local depending on the current
/// hour (next day if the anchor already passed), and any block that would
/// start at or after 21:00 rolls to 9:00 the following day.
pub fn time_blocks(
    records: &[Assignment],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<TimeBlock> {
    let local_now = now.with_timezone(&offset).naive_local();
    let start_hour = match local_now.hour() {
        h if h >= 17 => 19,
        h if h >= 12 => 14,
        _ => 9,
    };
    let mut cursor = at_hour(local_now.date(), start_hour);
    if local_now.hour() >= start_hour {
        cursor += Duration::days(1);
    }

    let mut blocks = Vec::new();
    for a in incomplete_by_score(records).into_iter().take(4) {
        let mut hours = a.estimated_hours.min(3.0);
        if a.status == AssignmentStatus::InProgress && a.progress > 0.0 {
            hours *= 1.0 - a.progress / 100.0;
        }
        let end = cursor + Duration::minutes((hours * 60.0).round() as i64);
        blocks.push(TimeBlock {
            id: a.id,
            name: a.name.clone(),
            class_name: a.class_name.clone(),
            start: local_to_utc(cursor, offset),
            end: local_to_utc(end, offset),
            duration_hours: hours,
        });

        cursor = end + Duration::hours(1);
        if cursor.hour() >= 21 {
            cursor = at_hour(cursor.date() + Duration::days(1), 9);
        }
    }
    blocks
}

/// Labeled stress bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressBand {
    /// No pending assignments at all.
    Relaxed,
    Low,
    Moderate,
    High,
    Critical,
}

impl StressBand {
    pub fn label(&self) -> &'static str {
        match self {
            StressBand::Relaxed => "Relaxed",
            StressBand::Low => "Low",
            StressBand::Moderate => "Moderate",
            StressBand::High => "High",
            StressBand::Critical => "Critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StressBand::Relaxed => "No pending assignments!",
            StressBand::Low => "You're managing well! Keep it up!",
            StressBand::Moderate => "Stay focused and prioritize critical tasks.",
            StressBand::High => "Consider using the focus timer and taking breaks.",
            StressBand::Critical => "Take a deep breath. Focus on one task at a time!",
        }
    }
}

/// Stress estimate over the incomplete records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressReport {
    /// 0-100.
    pub level: f64,
    pub band: StressBand,
}

/// `min(100, 25*critical + 10*high + 15*urgent(<48h) + avgScore/4)` over the
/// incomplete records, banded at 25/50/75.
pub fn stress_level(records: &[Assignment], now: DateTime<Utc>) -> StressReport {
    let incomplete: Vec<&Assignment> = records.iter().filter(|a| !a.is_completed()).collect();
    if incomplete.is_empty() {
        return StressReport {
            level: 0.0,
            band: StressBand::Relaxed,
        };
    }

    let critical = incomplete
        .iter()
        .filter(|a| a.priority_level == PriorityLevel::Critical)
        .count() as f64;
    let high = incomplete
        .iter()
        .filter(|a| a.priority_level == PriorityLevel::High)
        .count() as f64;
    let urgent = incomplete
        .iter()
        .filter(|a| (a.due_date - now).num_milliseconds() as f64 / 3_600_000.0 < 48.0)
        .count() as f64;
    let avg_score = incomplete
        .iter()
        .map(|a| a.priority_score as f64)
        .sum::<f64>()
        / incomplete.len() as f64;

    let level = (critical * 25.0 + high * 10.0 + urgent * 15.0 + avg_score / 4.0).min(100.0);
    let band = if level < 25.0 {
        StressBand::Low
    } else if level < 50.0 {
        StressBand::Moderate
    } else if level < 75.0 {
        StressBand::High
    } else {
        StressBand::Critical
    };
    StressReport { level, band }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSummary {
    /// Non-completed critical-tier records.
    pub critical: usize,
    /// Non-completed high-tier records.
    pub high: usize,
    /// Non-completed records due within the next 7 days, overdue included.
    pub due_this_week: usize,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Progress-weighted completion percentage, rounded.
    pub completion_pct: u8,
}

pub fn stats_summary(records: &[Assignment], now: DateTime<Utc>) -> StatsSummary {
    let horizon = now + Duration::hours(7 * 24);
    let mut stats = StatsSummary {
        total: records.len(),
        ..StatsSummary::default()
    };
    let mut total_progress = 0.0;
    for a in records {
        match a.status {
            AssignmentStatus::Completed => {
                stats.completed += 1;
                total_progress += 100.0;
            }
            AssignmentStatus::InProgress => {
                stats.in_progress += 1;
                total_progress += a.progress;
            }
            AssignmentStatus::NotStarted => {}
        }
        if !a.is_completed() {
            if a.priority_level == PriorityLevel::Critical {
                stats.critical += 1;
            } else if a.priority_level == PriorityLevel::High {
                stats.high += 1;
            }
            if a.due_date <= horizon {
                stats.due_this_week += 1;
            }
        }
    }
    if !records.is_empty() {
        stats.completion_pct = (total_progress / records.len() as f64).round() as u8;
    }
    stats
}

/// Effort bookkeeping over estimated hours.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeStats {
    pub total_hours_estimated: f64,
    pub hours_completed: f64,
    pub hours_remaining: f64,
    /// Mean priority score over the whole collection.
    pub avg_priority_score: f64,
}

pub fn time_stats(records: &[Assignment]) -> TimeStats {
    let mut stats = TimeStats::default();
    for a in records {
        stats.total_hours_estimated += a.estimated_hours;
        if a.is_completed() {
            stats.hours_completed += a.estimated_hours;
        } else {
            stats.hours_remaining += a.estimated_hours;
        }
        stats.avg_priority_score += a.priority_score as f64;
    }
    if !records.is_empty() {
        stats.avg_priority_score /= records.len() as f64;
    }
    stats
}

/// Tier counts over the incomplete records, for the distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriorityDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityDistribution {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

pub fn priority_distribution(records: &[Assignment]) -> PriorityDistribution {
    let mut dist = PriorityDistribution::default();
    for a in records.iter().filter(|a| !a.is_completed()) {
        match a.priority_level {
            PriorityLevel::Critical => dist.critical += 1,
            PriorityLevel::High => dist.high += 1,
            PriorityLevel::Medium => dist.medium += 1,
            PriorityLevel::Low => dist.low += 1,
        }
    }
    dist
}
