//! Week close orchestration
//!
//! Closing a week turns every muscle group's feedback into at most one set
//! adjustment. The input is a consistent snapshot of the week and the output
//! is an immutable description of every write; the host applies the whole
//! outcome in a single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::autovolume::{decide_volume, AutoVolumeFlags, AutoVolumeState, WeeklyFeedback};
use crate::mesocycle::WeekKind;
use crate::models::{
    CandidateExercise, ExerciseSet, FeedbackDelta, FutureExercise, LogEntity, LogReason,
    MuscleGroupWeeklyEntry, ProgressionLogEntry, SessionFeedbackRecord,
};
use crate::selection::{apply_delta, propagate_sets, select_candidate, SetsAdjustment};
use crate::strength::{best_sets_by_exercise, BestSet};

// ---------------------------------------------------------------------------
/// Snapshot and Outcome
// ---------------------------------------------------------------------------

/// Everything the engine reads to close one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    pub mesocycle_id: i64,
    pub week_id: i64,
    pub week_index: i32,
    #[serde(default)]
    pub week_kind: WeekKind,
    /// Feedback of every completed session of the week
    pub feedback: Vec<SessionFeedbackRecord>,
    /// Smoothing state per muscle group; missing means first adjustment
    #[serde(default)]
    pub states: BTreeMap<i64, AutoVolumeState>,
    /// Auto-volume eligible exercises of the week being closed
    #[serde(default)]
    pub candidates: Vec<CandidateExercise>,
    #[serde(default)]
    pub future_exercises: Vec<FutureExercise>,
    #[serde(default)]
    pub performed_sets: Vec<ExerciseSet>,
}

/// Decision record for one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroupDecision {
    pub muscle_group_id: i64,
    pub weekly: WeeklyFeedback,
    pub delta_raw: i32,
    pub delta_after_pain: i32,
    pub delta_final: i32,
    pub flags: AutoVolumeFlags,
    /// New smoothing state, persisted unconditionally
    pub state: AutoVolumeState,
    pub adjustment: Option<SetsAdjustment>,
}

/// `sets_target` write for the adjusted exercise or one of its future copies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetsTargetUpdate {
    pub session_exercise_id: i64,
    /// None for the adjusted exercise of the closed week
    pub session_id: Option<i64>,
    pub week_id: i64,
    pub prev_sets: i32,
    pub new_sets: i32,
    pub direction: i32,
    pub adjusted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekCloseOutcome {
    pub decisions: Vec<MuscleGroupDecision>,
    /// One per feedback record of the week
    pub delta_sets: Vec<FeedbackDelta>,
    pub exercise_updates: Vec<SetsTargetUpdate>,
    pub logs: Vec<ProgressionLogEntry>,
    /// Empty for deload weeks
    pub bests: Vec<BestSet>,
}

impl WeekCloseOutcome {
    pub fn states(&self) -> BTreeMap<i64, AutoVolumeState> {
        self.decisions
            .iter()
            .map(|d| (d.muscle_group_id, d.state))
            .collect()
    }

    pub fn decision(&self, muscle_group_id: i64) -> Option<&MuscleGroupDecision> {
        self.decisions
            .iter()
            .find(|d| d.muscle_group_id == muscle_group_id)
    }
}

// ---------------------------------------------------------------------------
/// Week Close
// ---------------------------------------------------------------------------

fn group_feedback(
    feedback: &[SessionFeedbackRecord],
) -> BTreeMap<i64, Vec<MuscleGroupWeeklyEntry>> {
    let mut grouped: BTreeMap<i64, Vec<MuscleGroupWeeklyEntry>> = BTreeMap::new();
    for record in feedback {
        grouped
            .entry(record.muscle_group_id)
            .or_default()
            .push(MuscleGroupWeeklyEntry::from(record));
    }
    grouped
}

fn sets_value(sets_target: i32) -> serde_json::Value {
    json!({ "sets_target": sets_target })
}

/// Close a week: decide, select and propagate for every muscle group.
///
/// Muscle groups are processed in ascending id order and never affect each
/// other. `now` stamps every adjustment.
pub fn close_week(snapshot: &WeekSnapshot, now: DateTime<Utc>) -> WeekCloseOutcome {
    let mut outcome = WeekCloseOutcome::default();
    let mut final_deltas: BTreeMap<i64, i32> = BTreeMap::new();

    for (muscle_group_id, entries) in group_feedback(&snapshot.feedback) {
        let volume = decide_volume(&entries, snapshot.states.get(&muscle_group_id));
        let mut flags = volume.flags;
        let mut adjustment = None;

        debug!(
            week_id = snapshot.week_id,
            muscle_group_id,
            fatigue_eff = volume.weekly.fatigue_eff,
            pump_week = volume.weekly.pump_week,
            pain_week = volume.weekly.pain_week,
            delta_raw = volume.delta_raw,
            delta_final = volume.delta_final,
            smoothing_blocked = flags.smoothing_blocked,
            "muscle group volume decision"
        );

        if volume.delta_final != 0 {
            let group_candidates: Vec<CandidateExercise> = snapshot
                .candidates
                .iter()
                .filter(|c| c.muscle_group_id == muscle_group_id)
                .cloned()
                .collect();

            match select_candidate(&group_candidates, volume.delta_final, volume.weekly.pain_week) {
                Some(chosen) => {
                    let applied = apply_delta(chosen, volume.delta_final, now);
                    info!(
                        muscle_group_id,
                        session_exercise_id = chosen.id,
                        prev_sets = applied.prev_sets,
                        new_sets = applied.new_sets,
                        "auto-volume adjustment applied"
                    );

                    outcome.exercise_updates.push(SetsTargetUpdate {
                        session_exercise_id: chosen.id,
                        session_id: None,
                        week_id: snapshot.week_id,
                        prev_sets: applied.prev_sets,
                        new_sets: applied.new_sets,
                        direction: applied.direction,
                        adjusted_at: now,
                    });
                    outcome.logs.push(ProgressionLogEntry {
                        entity: LogEntity::Exercise,
                        entity_id: chosen.id,
                        week_id: snapshot.week_id,
                        session_id: None,
                        reason: LogReason::AutoVolumeDelta,
                        prev_value: Some(sets_value(applied.prev_sets)),
                        new_value: sets_value(applied.new_sets),
                    });

                    let propagated = propagate_sets(
                        &snapshot.future_exercises,
                        chosen,
                        snapshot.week_index,
                        applied.new_sets,
                    );
                    for update in propagated {
                        outcome.exercise_updates.push(SetsTargetUpdate {
                            session_exercise_id: update.future_exercise_id,
                            session_id: Some(update.session_id),
                            week_id: update.week_id,
                            prev_sets: update.prev_sets,
                            new_sets: update.new_sets,
                            direction: applied.direction,
                            adjusted_at: now,
                        });
                        outcome.logs.push(ProgressionLogEntry {
                            entity: LogEntity::Exercise,
                            entity_id: update.future_exercise_id,
                            week_id: update.week_id,
                            session_id: Some(update.session_id),
                            reason: LogReason::AutoVolumePropagation,
                            prev_value: Some(sets_value(update.prev_sets)),
                            new_value: sets_value(update.new_sets),
                        });
                    }

                    adjustment = Some(applied);
                }
                None => {
                    flags.no_candidate = true;
                    warn!(
                        muscle_group_id,
                        delta = volume.delta_final,
                        candidates = group_candidates.len(),
                        "no eligible exercise, delta dropped"
                    );
                }
            }
        }

        final_deltas.insert(muscle_group_id, volume.delta_final);
        outcome.decisions.push(MuscleGroupDecision {
            muscle_group_id,
            weekly: volume.weekly,
            delta_raw: volume.delta_raw,
            delta_after_pain: volume.delta_after_pain,
            delta_final: volume.delta_final,
            flags,
            state: volume.state,
            adjustment,
        });
    }

    outcome.delta_sets = snapshot
        .feedback
        .iter()
        .map(|record| FeedbackDelta {
            session_id: record.session_id,
            muscle_group_id: record.muscle_group_id,
            delta_sets: final_deltas
                .get(&record.muscle_group_id)
                .copied()
                .unwrap_or(0),
        })
        .collect();

    if snapshot.week_kind.is_hard() {
        outcome.bests = best_sets_by_exercise(&snapshot.performed_sets);
    }

    info!(
        week_id = snapshot.week_id,
        muscle_groups = outcome.decisions.len(),
        updates = outcome.exercise_updates.len(),
        bests = outcome.bests.len(),
        "week closed"
    );

    outcome
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
