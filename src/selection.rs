//! Candidate selection for auto-volume adjustments
//!
//! Once a muscle group's weekly delta survives smoothing, exactly one of its
//! eligible exercises absorbs it. The new absolute set count is then mirrored
//! to the same exercise-slot in every later, not yet completed week.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::models::{CandidateExercise, ExerciseRole, FutureExercise};

/// ---------------------------------------------------------------------------
/// Filtering and Ranking
/// ---------------------------------------------------------------------------

/// Lower rank is preferred
fn role_rank(role: ExerciseRole, increase: bool) -> u8 {
  match (role, increase) {
    (ExerciseRole::Main, true) => 0,
    (ExerciseRole::Secondary, true) => 1,
    (ExerciseRole::Isolation, true) => 2,
    (ExerciseRole::Isolation, false) => 0,
    (ExerciseRole::Secondary, false) => 1,
    (ExerciseRole::Main, false) => 2,
  }
}

fn compare_candidates(a: &CandidateExercise, b: &CandidateExercise, increase: bool) -> Ordering {
  let by_role = role_rank(a.exercise_role, increase).cmp(&role_rank(b.exercise_role, increase));

  // Add to the friendliest joints, cut from the most stressed ones
  let by_stress = if increase {
    a.joint_stress.cmp(&b.joint_stress)
  } else {
    b.joint_stress.cmp(&a.joint_stress)
  };

  // None (never adjusted) sorts before any timestamp, then oldest first
  let by_recency = a.last_adjusted_at.cmp(&b.last_adjusted_at);

  by_role.then(by_stress).then(by_recency)
}

/// Keep candidates whose set count stays within bounds after `delta`
pub fn filter_candidates_for_delta(
  candidates: &[CandidateExercise],
  delta: i32,
) -> Vec<&CandidateExercise> {
  if delta == 0 {
    return Vec::new();
  }

  candidates
    .iter()
    .filter(|c| {
      let next_sets = c.sets_target + delta;
      if delta > 0 {
        next_sets <= c.max_sets
      } else {
        next_sets >= c.min_sets
      }
    })
    .collect()
}

/// Order candidates best-first for the direction of `delta`.
///
/// Role first, joint stress second, recency last. The sort is stable so
/// full ties keep their input order.
pub fn rank_candidates<'a>(
  candidates: &[&'a CandidateExercise],
  delta: i32,
) -> Vec<&'a CandidateExercise> {
  let increase = delta > 0;
  let mut ranked = candidates.to_vec();
  ranked.sort_by(|a, b| compare_candidates(a, b, increase));
  ranked
}

/// Pick the single exercise that absorbs `delta`, or None if nothing is eligible.
///
/// `pain_week` is accepted for the caller's decision record; stress is the
/// tiebreak at every pain level.
pub fn select_candidate(
  candidates: &[CandidateExercise],
  delta: i32,
  pain_week: i32,
) -> Option<&CandidateExercise> {
  if delta == 0 {
    return None;
  }

  let eligible = filter_candidates_for_delta(candidates, delta);
  let chosen = rank_candidates(&eligible, delta).into_iter().next();

  debug!(
    delta,
    pain_week,
    total = candidates.len(),
    eligible = eligible.len(),
    chosen = chosen.map(|c| c.id),
    "auto-volume candidate selection"
  );

  chosen
}

/// ---------------------------------------------------------------------------
/// Applying and Propagating
/// ---------------------------------------------------------------------------

/// Set change applied to the selected exercise of the closed week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetsAdjustment {
  pub session_exercise_id: i64,
  pub exercise_id: i64,
  pub muscle_group_id: i64,
  pub prev_sets: i32,
  pub new_sets: i32,
  /// -1 or 1
  pub direction: i32,
  pub adjusted_at: DateTime<Utc>,
}

/// Mirror of a `SetsAdjustment` on a later week's occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureSetsUpdate {
  pub future_exercise_id: i64,
  pub session_id: i64,
  pub week_id: i64,
  pub prev_sets: i32,
  pub new_sets: i32,
}

pub fn apply_delta(
  candidate: &CandidateExercise,
  delta: i32,
  now: DateTime<Utc>,
) -> SetsAdjustment {
  SetsAdjustment {
    session_exercise_id: candidate.id,
    exercise_id: candidate.exercise_id,
    muscle_group_id: candidate.muscle_group_id,
    prev_sets: candidate.sets_target,
    new_sets: candidate.sets_target + delta,
    direction: delta.signum(),
    adjusted_at: now,
  }
}

/// Copy `new_sets` onto every later, not completed occurrence of the
/// candidate's exercise-slot
pub fn propagate_sets(
  future: &[FutureExercise],
  candidate: &CandidateExercise,
  after_week_index: i32,
  new_sets: i32,
) -> Vec<FutureSetsUpdate> {
  future
    .iter()
    .filter(|f| {
      !f.completed
        && f.week_index > after_week_index
        && f.matches_slot(candidate.exercise_id, candidate.order_index, candidate.slot)
    })
    .map(|f| FutureSetsUpdate {
      future_exercise_id: f.id,
      session_id: f.session_id,
      week_id: f.week_id,
      prev_sets: f.sets_target,
      new_sets,
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
