//! Auto-Volume Decision Pipeline
//!
//! Weekly subjective feedback for one muscle group is reduced to a single
//! set-count delta in four steps:
//! 1. aggregate per-session entries into weekly scores (set-weighted)
//! 2. look up the raw delta in the fatigue x pump matrix
//! 3. let tendon pain override the delta
//! 4. smooth: only apply a delta after two consecutive weeks agree on direction
//!
//! Every step is a pure function; the smoothing state is returned for the
//! caller to persist whether or not the delta was applied.

use serde::{Deserialize, Serialize};

use crate::models::MuscleGroupWeeklyEntry;

const SCORE_MIN: i32 = 1;
const SCORE_MAX: i32 = 5;

// ---------------------------------------------------------------------------
/// Weekly Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyFeedback {
    pub fatigue_week: i32,
    pub doms_week: i32,
    pub pump_week: i32,
    /// Worst tendon pain of the week, never averaged
    pub pain_week: i32,
    /// Fatigue adjusted by soreness, clamped to 1..=5
    pub fatigue_eff: i32,
}

fn weighted_mean(
    entries: &[MuscleGroupWeeklyEntry],
    metric: impl Fn(&MuscleGroupWeeklyEntry) -> i32,
) -> f64 {
    let total: i32 = entries.iter().map(|e| e.sets).sum();
    if total <= 0 {
        return 0.0;
    }
    let weighted: f64 = entries
        .iter()
        .map(|e| metric(e) as f64 * e.sets as f64)
        .sum();
    weighted / total as f64
}

fn doms_modifier(doms_week: i32) -> i32 {
    match doms_week {
        1 => 1,
        d if d >= 4 => d - 3,
        _ => 0,
    }
}

/// Reduce one muscle group's per-session feedback to weekly scores.
///
/// Means are weighted by sets performed in each session and rounded; a week
/// with no sets yields 0 for every mean.
pub fn aggregate_weekly_feedback(entries: &[MuscleGroupWeeklyEntry]) -> WeeklyFeedback {
    let fatigue_week = weighted_mean(entries, |e| e.fatigue).round() as i32;
    let doms_week = weighted_mean(entries, |e| e.doms).round() as i32;
    let pump_week = weighted_mean(entries, |e| e.pump).round() as i32;
    let pain_week = entries.iter().map(|e| e.tendon_pain).fold(0, i32::max);

    let fatigue_eff = (fatigue_week - doms_modifier(doms_week)).clamp(SCORE_MIN, SCORE_MAX);

    WeeklyFeedback {
        fatigue_week,
        doms_week,
        pump_week,
        pain_week,
        fatigue_eff,
    }
}

// ---------------------------------------------------------------------------
/// Decision Matrix
// ---------------------------------------------------------------------------

/// Rows: effective fatigue 1..=5, columns: pump 1..=5
const DELTA_MATRIX: [[i32; 5]; 5] = [
    [1, 1, 1, 0, 0],
    [1, 1, 0, 0, 0],
    [1, 0, 0, 0, 0],
    [-1, -1, -1, 0, 0],
    [-1, -1, -1, -1, -1],
];

/// Raw set delta for a week, before pain and smoothing
pub fn compute_delta_from_matrix(fatigue_eff: i32, pump_week: i32) -> i32 {
    let row = usize::try_from(fatigue_eff - 1).ok();
    let col = usize::try_from(pump_week - 1).ok();
    match (row, col) {
        (Some(r), Some(c)) => DELTA_MATRIX
            .get(r)
            .and_then(|cells| cells.get(c))
            .copied()
            .unwrap_or(0),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
/// Pain Override
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainOverride {
    pub delta: i32,
    pub pain_override: bool,
    pub freeze_increase: bool,
}

/// Tendon pain takes priority over the matrix.
///
/// Pain 5 forces -2, pain 4 forces -1, pain 3 only blocks an increase.
pub fn apply_pain_override(delta: i32, pain_week: i32) -> PainOverride {
    let forced = match pain_week {
        5 => Some(-2),
        4 => Some(-1),
        3 if delta == 1 => Some(0),
        _ => None,
    };

    match forced {
        Some(delta) => PainOverride {
            delta,
            pain_override: true,
            freeze_increase: true,
        },
        None => PainOverride {
            delta,
            pain_override: false,
            freeze_increase: false,
        },
    }
}

// ---------------------------------------------------------------------------
/// Smoothing
// ---------------------------------------------------------------------------

/// Direction streak for one (mesocycle, muscle group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoVolumeState {
    /// -1, 0 or 1
    pub last_delta_sign: i32,
    pub consecutive_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingResult {
    pub delta_final: i32,
    pub smoothing_blocked: bool,
    /// Always persisted, even when blocked
    pub state: AutoVolumeState,
}

/// Advance the direction streak and decide whether `delta` takes effect.
///
/// A zero delta resets the streak. A nonzero delta applies only once two
/// consecutive weeks share its sign; an opposite-sign week restarts at 1.
pub fn apply_smoothing(delta: i32, state: Option<&AutoVolumeState>) -> SmoothingResult {
    if delta == 0 {
        return SmoothingResult {
            delta_final: 0,
            smoothing_blocked: false,
            state: AutoVolumeState::default(),
        };
    }

    let sign = delta.signum();
    let prev = state.copied().unwrap_or_default();
    let consecutive_count = if prev.last_delta_sign == sign {
        prev.consecutive_count + 1
    } else {
        1
    };
    let delta_final = if consecutive_count >= 2 { delta } else { 0 };

    SmoothingResult {
        delta_final,
        smoothing_blocked: delta_final == 0,
        state: AutoVolumeState {
            last_delta_sign: sign,
            consecutive_count,
        },
    }
}

// ---------------------------------------------------------------------------
/// Decision Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoVolumeFlags {
    pub pain_override: bool,
    pub freeze_increase: bool,
    pub smoothing_blocked: bool,
    /// A delta survived smoothing but no exercise could absorb it
    pub no_candidate: bool,
}

/// Everything decided for one muscle group before a candidate is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDecision {
    pub weekly: WeeklyFeedback,
    pub delta_raw: i32,
    pub delta_after_pain: i32,
    pub delta_final: i32,
    pub state: AutoVolumeState,
    pub flags: AutoVolumeFlags,
}

/// Run aggregation, matrix, pain override and smoothing in sequence
pub fn decide_volume(
    entries: &[MuscleGroupWeeklyEntry],
    state: Option<&AutoVolumeState>,
) -> VolumeDecision {
    let weekly = aggregate_weekly_feedback(entries);
    let delta_raw = compute_delta_from_matrix(weekly.fatigue_eff, weekly.pump_week);
    let pain = apply_pain_override(delta_raw, weekly.pain_week);
    let smoothing = apply_smoothing(pain.delta, state);

    VolumeDecision {
        weekly,
        delta_raw,
        delta_after_pain: pain.delta,
        delta_final: smoothing.delta_final,
        state: smoothing.state,
        flags: AutoVolumeFlags {
            pain_override: pain.pain_override,
            freeze_increase: pain.freeze_increase,
            smoothing_blocked: smoothing.smoothing_blocked,
            no_candidate: false,
        },
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
