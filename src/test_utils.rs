//! Test utilities and helpers for unit testing
//!
//! Mock data factories and time helpers shared by the engine tests. Every
//! factory returns a fully populated value with fixed defaults so tests only
//! spell out the fields they care about.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::mesocycle::WeekKind;
use crate::models::{
  CandidateExercise, ExerciseRole, FutureExercise, SessionFeedbackRecord, SessionSlot,
};
use crate::weekclose::WeekSnapshot;

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Candidate in muscle group 1, 3 sets within 1..=10, never adjusted.
/// `exercise_id` is `id * 10`.
pub fn mock_candidate(id: i64, role: ExerciseRole, joint_stress: i32) -> CandidateExercise {
  CandidateExercise {
    id,
    exercise_id: id * 10,
    muscle_group_id: 1,
    order_index: 1,
    sets_target: 3,
    min_sets: 1,
    max_sets: 10,
    exercise_role: role,
    joint_stress,
    last_adjusted_at: None,
    slot: SessionSlot::new(1, 1),
  }
}

/// Not yet completed occurrence with 3 sets at 50kg x 10
pub fn mock_future_exercise(
  id: i64,
  exercise_id: i64,
  week_index: i32,
  slot: SessionSlot,
) -> FutureExercise {
  FutureExercise {
    id,
    session_id: 100 + id,
    week_id: 1000 + week_index as i64,
    week_index,
    exercise_id,
    order_index: 1,
    slot,
    sets_target: 3,
    load_target: Some(50.0),
    reps_target_hint: Some(10),
    completed: false,
  }
}

pub fn mock_feedback(
  session_id: i64,
  muscle_group_id: i64,
  sets: i32,
  fatigue: i32,
  doms: i32,
  pump: i32,
  tendon_pain: i32,
) -> SessionFeedbackRecord {
  SessionFeedbackRecord {
    session_id,
    muscle_group_id,
    sets,
    fatigue,
    doms,
    pump,
    tendon_pain,
    perf: None,
  }
}

/// Hard week 2 (id 1002) of mesocycle 1 with no prior smoothing state
pub fn mock_week_snapshot(
  feedback: Vec<SessionFeedbackRecord>,
  candidates: Vec<CandidateExercise>,
) -> WeekSnapshot {
  WeekSnapshot {
    mesocycle_id: 1,
    week_id: 1002,
    week_index: 2,
    week_kind: WeekKind::Hard,
    feedback,
    states: BTreeMap::new(),
    candidates,
    future_exercises: Vec::new(),
    performed_sets: Vec::new(),
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Monday 2025-03-03 12:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
}

/// Create a DateTime N days before [`fixed_now`]
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  fixed_now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_candidate_defaults() {
    let candidate = mock_candidate(3, ExerciseRole::Isolation, 2);

    assert_eq!(candidate.exercise_id, 30);
    assert_eq!(candidate.sets_target, 3);
    assert!(candidate.min_sets <= candidate.sets_target);
    assert!(candidate.sets_target <= candidate.max_sets);
    assert!(candidate.last_adjusted_at.is_none());
  }

  #[test]
  fn test_mock_week_snapshot_is_hard_week() {
    let snapshot = mock_week_snapshot(vec![mock_feedback(1, 1, 3, 2, 2, 3, 1)], Vec::new());

    assert!(snapshot.week_kind.is_hard());
    assert_eq!(snapshot.week_id, 1002);
    assert_eq!(snapshot.feedback.len(), 1);
    assert!(snapshot.states.is_empty());
  }

  #[test]
  fn test_datetime_days_ago() {
    let week_ago = datetime_days_ago(7);
    assert_eq!((fixed_now() - week_ago).num_days(), 7);
  }

  #[test]
  fn test_assert_approx_eq_macro() {
    assert_approx_eq!(1.0_f64, 1.0001_f64, 0.001);
  }
}
