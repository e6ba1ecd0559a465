//! Priority scoring engine.
//!
//! Computes an assignment priority score (0-100) from four weighted factors:
//! - Urgency: step function of time until the due date (closer = higher)
//! - Importance: the assignment's share of the course grade
//! - Feasibility: hours remaining versus estimated effort
//! - Risk: inverse of the current course grade
//!
//! Scoring is pure and deterministic given an explicit `now`; the engine
//! never reads the wall clock itself.
//!
//! The urgency chain deliberately mixes units: the first two guards compare
//! hours, the rest compare days. A record 30 hours out lands in the "<48h"
//! bucket even though it is more than one day away. Collapsing the chain to
//! a single unit would move observable tier boundaries, so it stays as is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;

/// Discrete priority tier derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Critical => "critical",
            PriorityLevel::High => "high",
            PriorityLevel::Medium => "medium",
            PriorityLevel::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(PriorityLevel::Critical),
            "high" => Some(PriorityLevel::High),
            "medium" => Some(PriorityLevel::Medium),
            "low" => Some(PriorityLevel::Low),
            _ => None,
        }
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        PriorityLevel::Low
    }
}

/// Weights for each scoring factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    /// Weight for deadline urgency (default 0.40)
    pub urgency: f64,
    /// Weight for grade-share importance (default 0.30)
    pub importance: f64,
    /// Weight for schedule feasibility (default 0.20)
    pub feasibility: f64,
    /// Weight for grade risk (default 0.10)
    pub risk: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            urgency: 0.40,
            importance: 0.30,
            feasibility: 0.20,
            risk: 0.10,
        }
    }
}

/// Raw factor scores before weighting, kept for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub urgency: f64,
    pub importance: f64,
    pub feasibility: f64,
    pub risk: f64,
    /// Weighted sum at full precision (tier comparisons use this).
    pub weighted_total: f64,
}

/// Result of scoring one assignment at a point in time.
///
/// These are the derived fields the caller writes back onto the record;
/// scoring itself never mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityOutcome {
    /// Weighted total rounded once, after weighting (0-100).
    pub priority_score: u8,
    /// Tier derived from the unrounded weighted total.
    pub priority_level: PriorityLevel,
    pub hours_until_due: f64,
    pub days_until_due: f64,
}

/// Priority scoring engine.
pub struct PriorityEngine {
    weights: PriorityWeights,
}

impl PriorityEngine {
    /// Create an engine with the standard weights.
    pub fn new() -> Self {
        Self {
            weights: PriorityWeights::default(),
        }
    }

    /// Create with custom weights.
    pub fn with_weights(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &PriorityWeights {
        &self.weights
    }

    /// Score an assignment at `now`.
    pub fn score(&self, assignment: &Assignment, now: DateTime<Utc>) -> PriorityOutcome {
        let hours_until_due = hours_between(now, assignment.due_date);
        let days_until_due = hours_until_due / 24.0;

        let breakdown = self.breakdown(assignment, now);
        let total = breakdown.weighted_total;

        PriorityOutcome {
            priority_score: total.round().clamp(0.0, 100.0) as u8,
            priority_level: level_for(total),
            hours_until_due,
            days_until_due,
        }
    }

    /// Raw factor scores and the unrounded weighted total.
    pub fn breakdown(&self, assignment: &Assignment, now: DateTime<Utc>) -> PriorityBreakdown {
        let hours_until_due = hours_between(now, assignment.due_date);
        let days_until_due = hours_until_due / 24.0;

        let urgency = urgency_score(hours_until_due, days_until_due);
        let importance = assignment.grade_weight;
        let feasibility = feasibility_score(hours_until_due, assignment.estimated_hours);
        let risk = 100.0 - assignment.current_grade;

        let weighted_total = urgency * self.weights.urgency
            + importance * self.weights.importance
            + feasibility * self.weights.feasibility
            + risk * self.weights.risk;

        PriorityBreakdown {
            urgency,
            importance,
            feasibility,
            risk,
            weighted_total,
        }
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Score a single assignment with the standard weights.
pub fn score(assignment: &Assignment, now: DateTime<Utc>) -> PriorityOutcome {
    PriorityEngine::new().score(assignment, now)
}

fn hours_between(now: DateTime<Utc>, due: DateTime<Utc>) -> f64 {
    (due - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Urgency step function. First match wins; the sub-24h and sub-48h guards
/// use hours, the rest use days.
fn urgency_score(hours_until_due: f64, days_until_due: f64) -> f64 {
    if hours_until_due < 0.0 {
        100.0 // Overdue
    } else if hours_until_due < 24.0 {
        100.0
    } else if hours_until_due < 48.0 {
        90.0
    } else if days_until_due < 3.0 {
        80.0
    } else if days_until_due < 5.0 {
        60.0
    } else if days_until_due < 7.0 {
        40.0
    } else if days_until_due < 14.0 {
        20.0
    } else {
        10.0
    }
}

/// Feasibility step function comparing remaining hours against estimated
/// effort. With a zero estimate every positive-multiplier guard collapses to
/// `time_available < 0`, so non-overdue zero-estimate work falls through to
/// 20 (always feasible) and overdue work still scores 100 via the first
/// guard.
fn feasibility_score(time_available: f64, time_needed: f64) -> f64 {
    if time_available < time_needed {
        100.0 // Not enough time
    } else if time_available < time_needed * 2.0 {
        80.0
    } else if time_available < time_needed * 3.0 {
        60.0
    } else if time_available < time_needed * 5.0 {
        40.0
    } else {
        20.0
    }
}

/// Tier thresholds over the unrounded weighted total.
pub fn level_for(score: f64) -> PriorityLevel {
    if score >= 75.0 {
        PriorityLevel::Critical
    } else if score >= 55.0 {
        PriorityLevel::High
    } else if score >= 35.0 {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::test_support::assignment_due_in_hours;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn reference_scenario_due_in_20_hours() {
        // urgency 100, importance 30, feasibility 60 (20 < 3*10), risk 20
        // 0.40*100 + 0.30*30 + 0.20*60 + 0.10*20 = 63
        let now = Utc::now();
        let mut a = assignment_due_in_hours(now, 20);
        a.grade_weight = 30.0;
        a.estimated_hours = 10.0;
        a.current_grade = 80.0;

        let outcome = score(&a, now);
        assert_eq!(outcome.priority_score, 63);
        assert_eq!(outcome.priority_level, PriorityLevel::High);
    }

    #[test]
    fn overdue_zero_weight_never_reaches_critical() {
        // urgency 100, importance 0, feasibility 100 (-5 < 1), risk 0 -> 60
        // The weighting caps an otherwise-maximal overdue task at "high".
        let now = Utc::now();
        let mut a = assignment_due_in_hours(now, -5);
        a.grade_weight = 0.0;
        a.estimated_hours = 1.0;
        a.current_grade = 100.0;

        let outcome = score(&a, now);
        assert_eq!(outcome.priority_score, 60);
        assert_eq!(outcome.priority_level, PriorityLevel::High);
    }

    #[test]
    fn urgency_mixed_units_30_hours_is_sub_48h_bucket() {
        // 30 hours is past the 1-day mark but still below 48 hours.
        assert_eq!(urgency_score(30.0, 30.0 / 24.0), 90.0);
    }

    #[test]
    fn urgency_chain_ordering() {
        assert_eq!(urgency_score(-1.0, -1.0 / 24.0), 100.0);
        assert_eq!(urgency_score(23.9, 23.9 / 24.0), 100.0);
        assert_eq!(urgency_score(47.9, 47.9 / 24.0), 90.0);
        assert_eq!(urgency_score(60.0, 2.5), 80.0);
        assert_eq!(urgency_score(96.0, 4.0), 60.0);
        assert_eq!(urgency_score(144.0, 6.0), 40.0);
        assert_eq!(urgency_score(240.0, 10.0), 20.0);
        assert_eq!(urgency_score(400.0, 400.0 / 24.0), 10.0);
    }

    #[test]
    fn feasibility_thresholds() {
        assert_eq!(feasibility_score(5.0, 10.0), 100.0);
        assert_eq!(feasibility_score(15.0, 10.0), 80.0);
        assert_eq!(feasibility_score(25.0, 10.0), 60.0);
        assert_eq!(feasibility_score(45.0, 10.0), 40.0);
        assert_eq!(feasibility_score(60.0, 10.0), 20.0);
    }

    #[test]
    fn feasibility_zero_estimate() {
        // Non-overdue zero-estimate work is always feasible.
        assert_eq!(feasibility_score(10.0, 0.0), 20.0);
        assert_eq!(feasibility_score(0.0, 0.0), 20.0);
        // Overdue still trips the first guard.
        assert_eq!(feasibility_score(-1.0, 0.0), 100.0);
    }

    #[test]
    fn level_boundaries_exact() {
        assert_eq!(level_for(34.0), PriorityLevel::Low);
        assert_eq!(level_for(35.0), PriorityLevel::Medium);
        assert_eq!(level_for(54.0), PriorityLevel::Medium);
        assert_eq!(level_for(55.0), PriorityLevel::High);
        assert_eq!(level_for(74.0), PriorityLevel::High);
        assert_eq!(level_for(75.0), PriorityLevel::Critical);
    }

    #[test]
    fn overdue_tier_floor_with_minimal_other_factors() {
        // gradeWeight=0, estimatedHours=0, currentGrade=100:
        // urgency 100, importance 0, feasibility 100 (overdue), risk 0 -> 60
        let now = Utc::now();
        let mut a = assignment_due_in_hours(now, -3);
        a.grade_weight = 0.0;
        a.estimated_hours = 0.0;
        a.current_grade = 100.0;

        let outcome = score(&a, now);
        assert_eq!(outcome.priority_level, PriorityLevel::High);
    }

    #[test]
    fn scoring_is_idempotent_at_fixed_now() {
        let now = Utc::now();
        let mut a = assignment_due_in_hours(now, 72);
        a.grade_weight = 40.0;
        a.estimated_hours = 6.0;
        a.current_grade = 70.0;

        let first = score(&a, now);
        a.apply(first);
        let second = score(&a, now);
        assert_eq!(first, second);
    }

    #[test]
    fn hours_and_days_track_the_clock() {
        let now = Utc::now();
        let a = assignment_due_in_hours(now, 48);
        let outcome = score(&a, now);
        assert!((outcome.hours_until_due - 48.0).abs() < 1e-6);
        assert!((outcome.days_until_due - 2.0).abs() < 1e-6);

        let later = score(&a, now + Duration::hours(12));
        assert!((later.hours_until_due - 36.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn score_always_in_range(
            hours in -1000.0f64..10_000.0,
            weight in 0.0f64..=100.0,
            est in 0.0f64..500.0,
            grade in 0.0f64..=100.0,
        ) {
            let now = Utc::now();
            let mut a = assignment_due_in_hours(now, 0);
            a.due_date = now + Duration::milliseconds((hours * 3_600_000.0) as i64);
            a.grade_weight = weight;
            a.estimated_hours = est;
            a.current_grade = grade;

            let outcome = score(&a, now);
            prop_assert!(outcome.priority_score <= 100);
        }

        #[test]
        fn level_is_total_over_scores(total in -10.0f64..120.0) {
            // Every real number maps to exactly one tier.
            let level = level_for(total);
            let expected = if total >= 75.0 {
                PriorityLevel::Critical
            } else if total >= 55.0 {
                PriorityLevel::High
            } else if total >= 35.0 {
                PriorityLevel::Medium
            } else {
                PriorityLevel::Low
            };
            prop_assert_eq!(level, expected);
        }
    }
}
