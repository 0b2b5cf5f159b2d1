//! Strength estimation layer
//!
//! Converts (weight, reps) pairs into an estimated one-rep-max "strength level".
//! The e1RM is the currency used to compare different load/rep combinations
//! when projecting targets and when picking a week's best set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ExerciseSet;

/// Below this rep count Brzycki alone is used
const BLEND_START_REPS: i32 = 8;
/// Above this rep count Epley alone is used
const BLEND_END_REPS: i32 = 10;

// ---------------------------------------------------------------------------
/// e1RM Formulas
// ---------------------------------------------------------------------------

/// Brzycki: w × 36 / (37 - r)
fn brzycki(weight: f64, reps: i32) -> f64 {
  weight * 36.0 / (37.0 - reps as f64)
}

/// Epley: w × (1 + r/30)
fn epley(weight: f64, reps: i32) -> f64 {
  weight * (1.0 + reps as f64 / 30.0)
}

/// Estimated 1RM strength level.
///
/// Brzycki under 8 reps, Epley over 10, and a linear blend of the two in
/// 8..=10 so the curve has no jump where the formulas hand over.
/// Returns 0.0 for non-positive weight or reps ("no estimate").
pub fn estimate_e1rm(weight: f64, reps: i32) -> f64 {
  if weight <= 0.0 || reps <= 0 {
    return 0.0;
  }

  if reps < BLEND_START_REPS {
    return brzycki(weight, reps);
  }
  if reps > BLEND_END_REPS {
    return epley(weight, reps);
  }

  let t = (reps - BLEND_START_REPS) as f64 / (BLEND_END_REPS - BLEND_START_REPS) as f64;
  (1.0 - t) * brzycki(weight, reps) + t * epley(weight, reps)
}

// ---------------------------------------------------------------------------
/// Weekly Best Sets
// ---------------------------------------------------------------------------

/// Strongest set performed for an exercise during a week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestSet {
  pub exercise_id: i64,
  pub weight: f64,
  pub reps: i32,
  pub e1rm: f64,
}

impl BestSet {
  /// Whether `other` should replace `self` as the best set
  fn beaten_by(&self, other: &BestSet) -> bool {
    if other.e1rm != self.e1rm {
      return other.e1rm > self.e1rm;
    }
    if other.weight != self.weight {
      return other.weight > self.weight;
    }
    other.reps > self.reps
  }
}

/// Pick the highest-e1RM set per exercise.
///
/// Ties go to the heavier set, then to the one with more reps. Sets missing a
/// load or rep count, or with weight <= 0 / reps < 1, are ignored.
/// Results are ordered by exercise id.
pub fn best_sets_by_exercise(sets: &[ExerciseSet]) -> Vec<BestSet> {
  let mut best: BTreeMap<i64, BestSet> = BTreeMap::new();

  for item in sets {
    let (weight, reps) = match (item.set.load_used, item.set.reps_done) {
      (Some(w), Some(r)) if w > 0.0 && r >= 1 => (w, r),
      _ => continue,
    };

    let candidate = BestSet {
      exercise_id: item.exercise_id,
      weight,
      reps,
      e1rm: estimate_e1rm(weight, reps),
    };

    match best.get(&item.exercise_id) {
      Some(existing) if !existing.beaten_by(&candidate) => {}
      _ => {
        best.insert(item.exercise_id, candidate);
      }
    }
  }

  best.into_values().collect()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::models::PerformedSet;

  fn set(exercise_id: i64, weight: f64, reps: i32) -> ExerciseSet {
    ExerciseSet {
      exercise_id,
      set: PerformedSet::new(weight, reps),
    }
  }

  #[test]
  fn test_brzycki_below_blend_range() {
    assert_approx_eq!(estimate_e1rm(100.0, 5), 100.0 * 36.0 / 32.0, 1e-9);
    assert_approx_eq!(estimate_e1rm(100.0, 1), 100.0 * 36.0 / 36.0, 1e-9);
  }

  #[test]
  fn test_epley_above_blend_range() {
    assert_approx_eq!(estimate_e1rm(100.0, 12), 100.0 * (1.0 + 12.0 / 30.0), 1e-9);
  }

  #[test]
  fn test_blend_at_nine_reps_is_midpoint() {
    let brz9 = 100.0 * 36.0 / (37.0 - 9.0);
    let epl9 = 100.0 * (1.0 + 9.0 / 30.0);
    let expected = 0.5 * brz9 + 0.5 * epl9;

    assert_approx_eq!(estimate_e1rm(100.0, 9), expected, 1e-9);
  }

  #[test]
  fn test_blend_endpoints_match_single_formulas() {
    assert_approx_eq!(estimate_e1rm(80.0, 8), 80.0 * 36.0 / 29.0, 1e-9);
    assert_approx_eq!(estimate_e1rm(80.0, 10), 80.0 * (1.0 + 10.0 / 30.0), 1e-9);
  }

  #[test]
  fn test_invalid_inputs_return_zero() {
    assert_eq!(estimate_e1rm(0.0, 5), 0.0);
    assert_eq!(estimate_e1rm(-20.0, 5), 0.0);
    assert_eq!(estimate_e1rm(100.0, 0), 0.0);
    assert_eq!(estimate_e1rm(100.0, -3), 0.0);
  }

  #[test]
  fn test_monotonic_in_reps_and_weight() {
    for reps in 1..30 {
      assert!(
        estimate_e1rm(100.0, reps + 1) > estimate_e1rm(100.0, reps),
        "e1RM should grow with reps at {}",
        reps
      );
    }

    let mut weight = 2.5;
    while weight < 200.0 {
      assert!(estimate_e1rm(weight + 2.5, 8) > estimate_e1rm(weight, 8));
      weight += 2.5;
    }
  }

  #[test]
  fn test_best_set_picks_highest_e1rm() {
    let sets = vec![set(1, 100.0, 5), set(1, 105.0, 3), set(1, 90.0, 10)];

    let best = best_sets_by_exercise(&sets);

    assert_eq!(best.len(), 1);
    // 90x10 -> 120.0, 100x5 -> 112.5, 105x3 -> 111.2
    assert_eq!(best[0].weight, 90.0);
    assert_eq!(best[0].reps, 10);
  }

  #[test]
  fn test_best_set_tie_prefers_heavier_then_more_reps() {
    let sets = vec![set(7, 60.0, 6), set(7, 60.0, 6), set(7, 60.0, 6)];
    let best = best_sets_by_exercise(&sets);
    assert_eq!(best[0].reps, 6);

    // Equal e1RM can only come from identical pairs here; check the comparator directly
    let light = BestSet { exercise_id: 1, weight: 50.0, reps: 8, e1rm: 70.0 };
    let heavy = BestSet { exercise_id: 1, weight: 55.0, reps: 6, e1rm: 70.0 };
    let more_reps = BestSet { exercise_id: 1, weight: 55.0, reps: 7, e1rm: 70.0 };
    assert!(light.beaten_by(&heavy));
    assert!(!heavy.beaten_by(&light));
    assert!(heavy.beaten_by(&more_reps));
  }

  #[test]
  fn test_best_set_skips_incomplete_sets() {
    let sets = vec![
      ExerciseSet {
        exercise_id: 2,
        set: PerformedSet { load_used: None, reps_done: Some(10) },
      },
      ExerciseSet {
        exercise_id: 2,
        set: PerformedSet { load_used: Some(40.0), reps_done: None },
      },
      set(2, 0.0, 10),
      set(3, 20.0, 12),
    ];

    let best = best_sets_by_exercise(&sets);

    assert_eq!(best.len(), 1);
    assert_eq!(best[0].exercise_id, 3);
  }
}
