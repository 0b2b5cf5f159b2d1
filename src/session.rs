//! Completed-session planning
//!
//! When a session is completed the host hands over what was performed and
//! receives back everything that must be written:
//! - one feedback record per trained muscle group (with its performance score)
//! - the next load / rep hint for every exercise of the session
//! - the same targets mirrored onto later, not yet completed weeks
//! - an audit log entry per mutation

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::models::{
  Equipment, FutureExercise, LogEntity, LogReason, PerformedSet, ProgressionLogEntry,
  SessionFeedbackRecord, SessionSlot,
};
use crate::targets::{next_exercise_targets, ExerciseTargetsInput, SeriesTargetConfig};

/// ---------------------------------------------------------------------------
/// Exercise Performance
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExercisePerformance {
  /// Lowest rep count across performed sets
  pub reps_ref: Option<i32>,
  /// Mean performed load, else the planned load, else 0
  pub avg_load: f64,
}

impl ExercisePerformance {
  pub fn from_sets(sets: &[PerformedSet], load_target: Option<f64>) -> Self {
    let reps_ref = sets.iter().filter_map(|s| s.reps_done).min();

    let loads: Vec<f64> = sets.iter().filter_map(|s| s.load_used).collect();
    let avg_load = if loads.is_empty() {
      load_target.unwrap_or(0.0)
    } else {
      loads.iter().sum::<f64>() / loads.len() as f64
    };

    Self { reps_ref, avg_load }
  }

  /// load x reps, the unit of the muscle-group score
  pub fn score(&self) -> f64 {
    self.avg_load * self.reps_ref.unwrap_or(0) as f64
  }
}

/// Mean of per-exercise scores; 0 when there is nothing to score
pub fn muscle_group_score(scores: &[f64]) -> f64 {
  if scores.is_empty() {
    return 0.0;
  }
  scores.iter().sum::<f64>() / scores.len() as f64
}

/// Score 1..=5 comparing a session to the same session one week earlier.
///
/// 3 means "about the same" (within 10%), and is also used when there is no
/// usable previous score.
pub fn perf_session_score(current: f64, previous: f64) -> i32 {
  if previous <= 0.0 {
    return 3;
  }

  let delta_pct = (current - previous) / previous;

  if delta_pct <= -0.2 {
    1
  } else if delta_pct <= -0.1 {
    2
  } else if delta_pct < 0.1 {
    3
  } else if delta_pct >= 0.2 {
    5
  } else {
    4
  }
}

/// ---------------------------------------------------------------------------
/// Session Input
/// ---------------------------------------------------------------------------

/// One exercise of the session being completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExerciseState {
  pub id: i64,
  pub exercise_id: i64,
  pub muscle_group_id: i64,
  pub equipment: Equipment,
  pub order_index: i32,
  pub sets_target: i32,
  /// Sets target before an auto-volume change in this same completion
  #[serde(default)]
  pub prev_sets_target: Option<i32>,
  pub load_target: Option<f64>,
  pub reps_target_hint: Option<i32>,
  #[serde(default)]
  pub sets: Vec<PerformedSet>,
}

impl SessionExerciseState {
  pub fn performance(&self) -> ExercisePerformance {
    ExercisePerformance::from_sets(&self.sets, self.load_target)
  }
}

/// Same-slot exercise from the previous week, used for the performance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousExercise {
  pub muscle_group_id: i64,
  #[serde(default)]
  pub sets: Vec<PerformedSet>,
}

/// Subjective ratings entered for one muscle group at session end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleGroupFeedback {
  pub muscle_group_id: i64,
  pub fatigue: i32,
  pub doms: i32,
  pub pump: i32,
  pub tendon_pain: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlanInput {
  pub session_id: i64,
  pub week_id: i64,
  pub week_index: i32,
  pub slot: SessionSlot,
  pub exercises: Vec<SessionExerciseState>,
  #[serde(default)]
  pub feedback: Vec<MuscleGroupFeedback>,
  /// Records already stored for this session, if it is re-submitted
  #[serde(default)]
  pub existing_feedback: Vec<SessionFeedbackRecord>,
  /// None for the first week of a mesocycle
  #[serde(default)]
  pub previous_session: Option<Vec<PreviousExercise>>,
  #[serde(default)]
  pub future_exercises: Vec<FutureExercise>,
}

/// ---------------------------------------------------------------------------
/// Session Output
/// ---------------------------------------------------------------------------

/// Targets returned to the client for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetUpdate {
  pub session_exercise_id: i64,
  pub load_target: f64,
  pub reps_target_hint: i32,
  pub suggestion: Option<String>,
}

/// Row the host must write, for this session or a later one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTargetsWrite {
  pub session_exercise_id: i64,
  pub session_id: i64,
  pub week_id: i64,
  pub load_target: Option<f64>,
  pub reps_target_hint: Option<i32>,
  pub sets_target: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
  pub feedback: Vec<SessionFeedbackRecord>,
  pub target_updates: Vec<TargetUpdate>,
  pub writes: Vec<ExerciseTargetsWrite>,
  pub logs: Vec<ProgressionLogEntry>,
}

/// ---------------------------------------------------------------------------
/// Feedback Records
/// ---------------------------------------------------------------------------

/// Performed set counts per muscle group.
///
/// Exercises with no logged sets are skipped, so a group appears only when
/// at least one of its exercises has set input.
pub fn sets_by_muscle_group(exercises: &[SessionExerciseState]) -> BTreeMap<i64, i32> {
  let mut counts = BTreeMap::new();
  for exercise in exercises.iter().filter(|e| !e.sets.is_empty()) {
    *counts.entry(exercise.muscle_group_id).or_insert(0) += exercise.sets.len() as i32;
  }
  counts
}

fn current_group_score(exercises: &[SessionExerciseState], muscle_group_id: i64) -> f64 {
  let scores: Vec<f64> = exercises
    .iter()
    .filter(|e| e.muscle_group_id == muscle_group_id)
    .map(|e| {
      let perf = e.performance();
      let reps = perf.reps_ref.or(e.reps_target_hint).unwrap_or(0);
      perf.avg_load * reps as f64
    })
    .collect();
  muscle_group_score(&scores)
}

fn previous_group_score(previous: Option<&[PreviousExercise]>, muscle_group_id: i64) -> f64 {
  let Some(previous) = previous else {
    return 0.0;
  };
  let scores: Vec<f64> = previous
    .iter()
    .filter(|e| e.muscle_group_id == muscle_group_id)
    .map(|e| ExercisePerformance::from_sets(&e.sets, None).score())
    .collect();
  muscle_group_score(&scores)
}

fn feedback_value(record: &SessionFeedbackRecord) -> serde_json::Value {
  json!({
    "fatigue": record.fatigue,
    "doms": record.doms,
    "pump": record.pump,
    "tendon_pain": record.tendon_pain,
    "perf": record.perf,
    "sets": record.sets,
  })
}

/// Build the stored feedback record for every muscle group rated this session.
///
/// The record's `sets` weight is the performed set count, falling back to
/// the planned sets of the group's exercises when nothing was logged.
pub fn record_feedback(
  input: &SessionPlanInput,
) -> (Vec<SessionFeedbackRecord>, Vec<ProgressionLogEntry>) {
  let performed = sets_by_muscle_group(&input.exercises);
  let mut records = Vec::with_capacity(input.feedback.len());
  let mut logs = Vec::with_capacity(input.feedback.len());

  for rating in &input.feedback {
    let mg = rating.muscle_group_id;
    let current = current_group_score(&input.exercises, mg);
    let previous = previous_group_score(input.previous_session.as_deref(), mg);

    let planned_sets: i32 = input
      .exercises
      .iter()
      .filter(|e| e.muscle_group_id == mg)
      .map(|e| e.sets_target)
      .sum();

    let record = SessionFeedbackRecord {
      session_id: input.session_id,
      muscle_group_id: mg,
      sets: performed.get(&mg).copied().unwrap_or(planned_sets),
      fatigue: rating.fatigue,
      doms: rating.doms,
      pump: rating.pump,
      tendon_pain: rating.tendon_pain,
      perf: Some(perf_session_score(current, previous)),
    };

    let prev_value = input
      .existing_feedback
      .iter()
      .find(|r| r.muscle_group_id == mg)
      .map(|r| feedback_value(r));

    logs.push(ProgressionLogEntry {
      entity: LogEntity::MuscleGroupSession,
      entity_id: mg,
      week_id: input.week_id,
      session_id: Some(input.session_id),
      reason: LogReason::SessionFeedback,
      prev_value,
      new_value: feedback_value(&record),
    });
    records.push(record);
  }

  (records, logs)
}

/// ---------------------------------------------------------------------------
/// Target Updates
/// ---------------------------------------------------------------------------

fn targets_value(
  load_target: Option<f64>,
  reps_target_hint: Option<i32>,
  sets_target: i32,
) -> serde_json::Value {
  json!({
    "load_target": load_target,
    "reps_target_hint": reps_target_hint,
    "sets_target": sets_target,
  })
}

/// Mirror targets onto later, not completed occurrences of the same
/// exercise-slot. Occurrences already holding these values are skipped.
fn propagate_targets(
  input: &SessionPlanInput,
  exercise: &SessionExerciseState,
  load_target: Option<f64>,
  reps_target_hint: Option<i32>,
  sets_target: i32,
  plan: &mut SessionPlan,
) {
  let matching = input.future_exercises.iter().filter(|f| {
    !f.completed
      && f.week_index > input.week_index
      && f.matches_slot(exercise.exercise_id, exercise.order_index, input.slot)
  });

  for future in matching {
    if future.load_target == load_target
      && future.reps_target_hint == reps_target_hint
      && future.sets_target == sets_target
    {
      continue;
    }

    plan.writes.push(ExerciseTargetsWrite {
      session_exercise_id: future.id,
      session_id: future.session_id,
      week_id: future.week_id,
      load_target,
      reps_target_hint,
      sets_target,
    });
    plan.logs.push(ProgressionLogEntry {
      entity: LogEntity::Exercise,
      entity_id: future.id,
      week_id: future.week_id,
      session_id: Some(future.session_id),
      reason: LogReason::TargetsPropagation,
      prev_value: Some(targets_value(
        future.load_target,
        future.reps_target_hint,
        future.sets_target,
      )),
      new_value: targets_value(load_target, reps_target_hint, sets_target),
    });
  }
}

/// Compute next-session targets for every exercise of the session.
///
/// Exercises with no usable rep reference only carry a changed set count
/// forward. All others get a new load and rep hint from
/// [`next_exercise_targets`], written to the exercise and its future slots.
pub fn plan_target_updates(input: &SessionPlanInput, config: &SeriesTargetConfig) -> SessionPlan {
  let mut plan = SessionPlan::default();

  for exercise in &input.exercises {
    let perf = exercise.performance();
    let prev_sets = exercise.prev_sets_target.unwrap_or(exercise.sets_target);
    let sets_changed = exercise.sets_target != prev_sets;

    let reps_ref_prev = match perf.reps_ref.or(exercise.reps_target_hint) {
      Some(reps) if reps > 0 => reps,
      _ => {
        if sets_changed {
          plan.writes.push(ExerciseTargetsWrite {
            session_exercise_id: exercise.id,
            session_id: input.session_id,
            week_id: input.week_id,
            load_target: exercise.load_target,
            reps_target_hint: exercise.reps_target_hint,
            sets_target: exercise.sets_target,
          });
          propagate_targets(
            input,
            exercise,
            exercise.load_target,
            exercise.reps_target_hint,
            exercise.sets_target,
            &mut plan,
          );
        }
        debug!(session_exercise_id = exercise.id, "no rep reference, targets kept");
        continue;
      }
    };

    let targets = next_exercise_targets(
      &ExerciseTargetsInput {
        equipment: exercise.equipment,
        load_prev: exercise.load_target.unwrap_or(perf.avg_load),
        reps_ref_prev,
        sets_prev: exercise.sets_target,
        load_chosen: exercise.load_target,
      },
      config,
    );

    let new_load = Some(targets.load_target);
    let new_hint = Some(targets.reps_target_hint);
    let targets_changed = new_load != exercise.load_target || new_hint != exercise.reps_target_hint;

    if targets_changed || sets_changed {
      plan.writes.push(ExerciseTargetsWrite {
        session_exercise_id: exercise.id,
        session_id: input.session_id,
        week_id: input.week_id,
        load_target: new_load,
        reps_target_hint: new_hint,
        sets_target: exercise.sets_target,
      });

      if targets_changed {
        info!(
          session_exercise_id = exercise.id,
          load_target = targets.load_target,
          reps_target_hint = targets.reps_target_hint,
          "exercise targets updated"
        );
        plan.logs.push(ProgressionLogEntry {
          entity: LogEntity::Exercise,
          entity_id: exercise.id,
          week_id: input.week_id,
          session_id: Some(input.session_id),
          reason: LogReason::TargetsUpdate,
          prev_value: Some(targets_value(
            exercise.load_target,
            exercise.reps_target_hint,
            prev_sets,
          )),
          new_value: targets_value(new_load, new_hint, exercise.sets_target),
        });
      }

      propagate_targets(input, exercise, new_load, new_hint, exercise.sets_target, &mut plan);
    }

    plan.target_updates.push(TargetUpdate {
      session_exercise_id: exercise.id,
      load_target: targets.load_target,
      reps_target_hint: targets.reps_target_hint,
      suggestion: targets.suggestion,
    });
  }

  plan
}

/// Feedback records plus target updates for one completed session
pub fn plan_session(input: &SessionPlanInput, config: &SeriesTargetConfig) -> SessionPlan {
  let (feedback, mut feedback_logs) = record_feedback(input);
  let mut plan = plan_target_updates(input, config);

  feedback_logs.append(&mut plan.logs);
  plan.logs = feedback_logs;
  plan.feedback = feedback;
  plan
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_future_exercise;

  fn barbell_exercise(
    id: i64,
    muscle_group_id: i64,
    sets: Vec<PerformedSet>,
  ) -> SessionExerciseState {
    SessionExerciseState {
      id,
      exercise_id: id * 10,
      muscle_group_id,
      equipment: Equipment::Barbell,
      order_index: 1,
      sets_target: 3,
      prev_sets_target: None,
      load_target: Some(100.0),
      reps_target_hint: Some(8),
      sets,
    }
  }

  fn session_input(exercises: Vec<SessionExerciseState>) -> SessionPlanInput {
    SessionPlanInput {
      session_id: 500,
      week_id: 2002,
      week_index: 2,
      slot: SessionSlot::new(1, 1),
      exercises,
      feedback: Vec::new(),
      existing_feedback: Vec::new(),
      previous_session: None,
      future_exercises: Vec::new(),
    }
  }

  #[test]
  fn test_performance_from_sets() {
    let sets = vec![
      PerformedSet::new(50.0, 10),
      PerformedSet::new(55.0, 8),
      PerformedSet { load_used: None, reps_done: Some(9) },
    ];

    let perf = ExercisePerformance::from_sets(&sets, Some(40.0));

    assert_eq!(perf.reps_ref, Some(8));
    assert_eq!(perf.avg_load, 52.5);
    assert_eq!(perf.score(), 420.0);
  }

  #[test]
  fn test_performance_falls_back_to_load_target() {
    let perf = ExercisePerformance::from_sets(&[], Some(40.0));
    assert_eq!(perf.reps_ref, None);
    assert_eq!(perf.avg_load, 40.0);

    let perf = ExercisePerformance::from_sets(&[], None);
    assert_eq!(perf.avg_load, 0.0);
    assert_eq!(perf.score(), 0.0);
  }

  #[test]
  fn test_perf_session_score_thresholds() {
    assert_eq!(perf_session_score(500.0, 0.0), 3);
    assert_eq!(perf_session_score(79.0, 100.0), 1);
    assert_eq!(perf_session_score(80.0, 100.0), 1);
    assert_eq!(perf_session_score(85.0, 100.0), 2);
    assert_eq!(perf_session_score(90.0, 100.0), 2);
    assert_eq!(perf_session_score(95.0, 100.0), 3);
    assert_eq!(perf_session_score(109.0, 100.0), 3);
    assert_eq!(perf_session_score(110.0, 100.0), 4);
    assert_eq!(perf_session_score(120.0, 100.0), 5);
  }

  #[test]
  fn test_muscle_group_score_empty_is_zero() {
    assert_eq!(muscle_group_score(&[]), 0.0);
    assert_eq!(muscle_group_score(&[100.0, 300.0]), 200.0);
  }

  #[test]
  fn test_sets_by_muscle_group_counts_logged_sets() {
    let exercises = vec![
      barbell_exercise(1, 7, vec![PerformedSet::new(100.0, 8); 3]),
      barbell_exercise(2, 7, vec![PerformedSet::new(60.0, 12); 2]),
      barbell_exercise(3, 8, vec![PerformedSet { load_used: None, reps_done: None }]),
    ];

    let counts = sets_by_muscle_group(&exercises);

    assert_eq!(counts.get(&7), Some(&5));
    assert_eq!(counts.get(&8), Some(&1));
  }

  #[test]
  fn test_sets_by_muscle_group_skips_exercises_without_sets() {
    let exercises = vec![
      barbell_exercise(1, 7, Vec::new()),
      barbell_exercise(2, 8, Vec::new()),
      barbell_exercise(3, 8, vec![PerformedSet::new(60.0, 12); 2]),
    ];

    let counts = sets_by_muscle_group(&exercises);

    assert_eq!(counts.get(&7), None);
    assert_eq!(counts.get(&8), Some(&2));
  }

  #[test]
  fn test_record_feedback_scores_against_previous_week() {
    let exercise = barbell_exercise(1, 7, vec![PerformedSet::new(100.0, 8); 3]);
    let mut input = session_input(vec![exercise]);
    input.feedback = vec![MuscleGroupFeedback {
      muscle_group_id: 7,
      fatigue: 3,
      doms: 2,
      pump: 4,
      tendon_pain: 1,
    }];
    // 90 x 8 last week -> 720, now 100 x 8 -> 800: +11%
    input.previous_session = Some(vec![PreviousExercise {
      muscle_group_id: 7,
      sets: vec![PerformedSet::new(90.0, 8); 3],
    }]);

    let (records, logs) = record_feedback(&input);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sets, 3);
    assert_eq!(records[0].perf, Some(4));
    assert_eq!(logs[0].reason, LogReason::SessionFeedback);
    assert_eq!(logs[0].entity, LogEntity::MuscleGroupSession);
    assert!(logs[0].prev_value.is_none());
  }

  #[test]
  fn test_record_feedback_uses_planned_sets_when_none_logged() {
    let mut input = session_input(vec![barbell_exercise(1, 7, Vec::new())]);
    let rating = |muscle_group_id| MuscleGroupFeedback {
      muscle_group_id,
      fatigue: 2,
      doms: 2,
      pump: 2,
      tendon_pain: 1,
    };
    input.feedback = vec![rating(7), rating(9)];

    let (records, _) = record_feedback(&input);

    // Group 7 was trained without logging sets: planned sets weigh the record
    assert_eq!(records[0].muscle_group_id, 7);
    assert_eq!(records[0].sets, 3);
    assert_eq!(records[0].perf, Some(3));

    // Group 9 has no exercise in this session
    assert_eq!(records[1].sets, 0);
  }

  #[test]
  fn test_record_feedback_logs_stored_values_as_previous() {
    let mut input = session_input(vec![barbell_exercise(1, 7, vec![PerformedSet::new(100.0, 8)])]);
    input.feedback = vec![MuscleGroupFeedback {
      muscle_group_id: 7,
      fatigue: 4,
      doms: 3,
      pump: 2,
      tendon_pain: 1,
    }];
    input.existing_feedback = vec![SessionFeedbackRecord {
      session_id: 500,
      muscle_group_id: 7,
      sets: 2,
      fatigue: 2,
      doms: 2,
      pump: 3,
      tendon_pain: 1,
      perf: Some(3),
    }];

    let (_, logs) = record_feedback(&input);

    let prev = logs[0].prev_value.as_ref().unwrap();
    assert_eq!(prev["fatigue"], json!(2));
    assert_eq!(prev["sets"], json!(2));
    assert!(prev.get("delta_sets").is_none());
    assert_eq!(logs[0].new_value["fatigue"], json!(4));
    assert!(logs[0].new_value.get("delta_sets").is_none());
  }

  #[test]
  fn test_plan_updates_targets_and_propagates() {
    let exercise = barbell_exercise(
      1,
      7,
      vec![PerformedSet::new(100.0, 8), PerformedSet::new(100.0, 8), PerformedSet::new(100.0, 7)],
    );
    let slot = SessionSlot::new(1, 1);
    let mut input = session_input(vec![exercise]);

    let stale = mock_future_exercise(31, 10, 3, slot);
    let mut done = mock_future_exercise(32, 10, 4, slot);
    done.completed = true;
    let mut already = mock_future_exercise(33, 10, 5, slot);
    already.load_target = Some(102.5);
    already.reps_target_hint = Some(7);
    input.future_exercises = vec![stale, done, already];

    let plan = plan_target_updates(&input, &SeriesTargetConfig::default());

    assert_eq!(plan.target_updates.len(), 1);
    assert_eq!(plan.target_updates[0].load_target, 102.5);
    assert_eq!(plan.target_updates[0].reps_target_hint, 7);
    assert_eq!(plan.target_updates[0].suggestion, None);

    let written: Vec<i64> = plan.writes.iter().map(|w| w.session_exercise_id).collect();
    assert_eq!(written, vec![1, 31]);

    let reasons: Vec<LogReason> = plan.logs.iter().map(|l| l.reason).collect();
    assert_eq!(reasons, vec![LogReason::TargetsUpdate, LogReason::TargetsPropagation]);
    assert_eq!(plan.logs[1].week_id, 1003);
  }

  #[test]
  fn test_plan_without_reps_only_carries_changed_sets() {
    let mut exercise = barbell_exercise(1, 7, Vec::new());
    exercise.reps_target_hint = None;
    exercise.sets_target = 4;
    exercise.prev_sets_target = Some(3);
    let slot = SessionSlot::new(1, 1);
    let mut input = session_input(vec![exercise]);
    input.future_exercises = vec![mock_future_exercise(31, 10, 3, slot)];

    let plan = plan_target_updates(&input, &SeriesTargetConfig::default());

    assert!(plan.target_updates.is_empty());
    assert_eq!(plan.writes.len(), 2);
    assert!(plan.writes.iter().all(|w| w.sets_target == 4));
    assert_eq!(plan.logs.len(), 1);
    assert_eq!(plan.logs[0].reason, LogReason::TargetsPropagation);
  }

  #[test]
  fn test_plan_without_reps_and_no_change_writes_nothing() {
    let mut exercise = barbell_exercise(1, 7, Vec::new());
    exercise.reps_target_hint = None;

    let plan = plan_target_updates(&session_input(vec![exercise]), &SeriesTargetConfig::default());

    assert!(plan.writes.is_empty());
    assert!(plan.logs.is_empty());
  }

  #[test]
  fn test_plan_session_orders_feedback_logs_first() {
    let exercise = barbell_exercise(1, 7, vec![PerformedSet::new(100.0, 8)]);
    let mut input = session_input(vec![exercise]);
    input.feedback = vec![MuscleGroupFeedback {
      muscle_group_id: 7,
      fatigue: 2,
      doms: 2,
      pump: 3,
      tendon_pain: 1,
    }];

    let plan = plan_session(&input, &SeriesTargetConfig::default());

    assert_eq!(plan.feedback.len(), 1);
    assert_eq!(plan.logs[0].reason, LogReason::SessionFeedback);
    assert_eq!(plan.logs[1].reason, LogReason::TargetsUpdate);
  }
}
