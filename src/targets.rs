//! Load/Rep Target Projection
//!
//! Given the last working set (or the last session's targets) this module
//! derives the next weight and rep target for an exercise:
//! - auto mode adds the smallest normal increment for the equipment
//! - a user-chosen weight is honoured and reps are re-derived through e1RM
//! - weekly rep drift and per-equipment minimum reps are enforced
//!
//! When no safe rep count exists the rep target is removed (`None`) and
//! flagged, never replaced by a clamped guess.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Equipment;
use crate::strength::estimate_e1rm;

// ---------------------------------------------------------------------------
/// Equipment Profiles
// ---------------------------------------------------------------------------

/// Load increments and rep floor for one equipment class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentProfile {
    /// Smallest "normal" weight increment
    pub step_min: f64,
    /// Largest "normal" weight increment
    pub step_max: f64,
    /// Load above `step_max` that costs one rep on the next-session hint
    pub overstep_unit: f64,
    pub min_reps: i32,
}

impl EquipmentProfile {
    pub fn dumbbell() -> Self {
        Self {
            step_min: 1.0,
            step_max: 2.5,
            overstep_unit: 1.5,
            min_reps: 5,
        }
    }

    pub fn barbell() -> Self {
        Self {
            step_min: 2.5,
            step_max: 5.0,
            overstep_unit: 2.5,
            min_reps: 3,
        }
    }

    pub fn machine() -> Self {
        Self {
            step_min: 2.5,
            step_max: 5.0,
            overstep_unit: 2.5,
            min_reps: 5,
        }
    }
}

// ---------------------------------------------------------------------------
/// Series Target Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesTargetConfig {
    pub dumbbell: EquipmentProfile,
    pub barbell: EquipmentProfile,
    pub machine: EquipmentProfile,
    /// Overrides every profile's `min_reps` when set
    pub min_reps_override: Option<i32>,
    pub weight_quantization: f64,
    pub max_rep_drop_per_week: i32,
    pub max_rep_increase_per_week: i32,
    /// Max allowed weight / e1RM ratio; unset disables the check
    pub max_intensity: Option<f64>,
    pub max_reps_scan: i32,
    pub remove_reps_if_clamped: bool,
}

impl Default for SeriesTargetConfig {
    fn default() -> Self {
        Self {
            dumbbell: EquipmentProfile::dumbbell(),
            barbell: EquipmentProfile::barbell(),
            machine: EquipmentProfile::machine(),
            min_reps_override: None,
            weight_quantization: 0.5,
            max_rep_drop_per_week: 3,
            max_rep_increase_per_week: 5,
            max_intensity: None,
            max_reps_scan: 30,
            remove_reps_if_clamped: false,
        }
    }
}

impl SeriesTargetConfig {
    pub fn profile(&self, equipment: Equipment) -> &EquipmentProfile {
        match equipment {
            Equipment::Dumbbell => &self.dumbbell,
            Equipment::Barbell => &self.barbell,
            Equipment::Machine => &self.machine,
        }
    }

    pub fn min_reps(&self, equipment: Equipment) -> i32 {
        self.min_reps_override
            .unwrap_or_else(|| self.profile(equipment).min_reps)
    }

    pub fn quantize(&self, weight: f64) -> f64 {
        quantize_weight(weight, self.weight_quantization)
    }
}

/// Round a weight to the nearest multiple of `step`
pub fn quantize_weight(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

// ---------------------------------------------------------------------------
/// Flags and Results
// ---------------------------------------------------------------------------

/// Named conditions raised while projecting a target; all default to false
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTargetFlags {
    /// No weight chosen, plain auto increment
    pub auto: bool,
    /// A user-chosen weight drove the projection
    pub override_used: bool,
    pub same_weight_plus_one_rep: bool,
    pub under_auto_but_not_below_prev_plus_one_rep: bool,
    pub in_delta_range_keep_reps: bool,
    pub above_range_e1rm: bool,
    pub below_prev_e1rm: bool,
    pub clamped_by_min_reps: bool,
    pub clamped_by_max_drop: bool,
    pub clamped_by_max_increase: bool,
    pub too_heavy: bool,
    /// No safe rep target: caller must ask for manual entry
    pub reps_removed_out_of_bounds: bool,
}

impl SeriesTargetFlags {
    pub fn clamped(&self) -> bool {
        self.clamped_by_min_reps || self.clamped_by_max_drop || self.clamped_by_max_increase
    }
}

/// Last performed working set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousSet {
    pub weight: f64,
    pub reps: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesTarget {
    pub weight_target: f64,
    pub reps_target: Option<i32>,
    pub flags: SeriesTargetFlags,
}

/// Outcome of the equivalent-reps search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepSearch {
    pub reps_target: Option<i32>,
    pub flags: SeriesTargetFlags,
    /// e1RM the search tried to match
    pub e_target: f64,
}

// ---------------------------------------------------------------------------
/// Rep Search
// ---------------------------------------------------------------------------

/// Find the rep count at `weight_user` whose e1RM best matches
/// `(weight_anchor, reps_anchor)`, then enforce the weekly drift limits.
///
/// Ties on e1RM distance go to the rep count closest to `reps_anchor`.
pub fn find_reps_for_weight(
    weight_anchor: f64,
    reps_anchor: i32,
    weight_user: f64,
    equipment: Equipment,
    config: &SeriesTargetConfig,
) -> RepSearch {
    let mut flags = SeriesTargetFlags {
        override_used: true,
        ..Default::default()
    };

    let e_target = estimate_e1rm(weight_anchor, reps_anchor);

    let mut best_reps = 1;
    let mut best_diff = f64::INFINITY;
    for reps in 1..=config.max_reps_scan.max(1) {
        let diff = (estimate_e1rm(weight_user, reps) - e_target).abs();
        let closer_to_anchor = (reps - reps_anchor).abs() < (best_reps - reps_anchor).abs();
        if diff < best_diff || (diff == best_diff && closer_to_anchor) {
            best_diff = diff;
            best_reps = reps;
        }
    }

    let mut reps_target = best_reps;

    // Heavier never earns more reps, lighter never costs reps
    if weight_user > weight_anchor && reps_target > reps_anchor {
        reps_target = reps_anchor;
        flags.clamped_by_max_increase = true;
    }
    if weight_user < weight_anchor && reps_target < reps_anchor {
        reps_target = reps_anchor;
        flags.clamped_by_max_drop = true;
    }

    if reps_anchor - reps_target > config.max_rep_drop_per_week {
        reps_target = reps_anchor - config.max_rep_drop_per_week;
        flags.clamped_by_max_drop = true;
    }
    if reps_target - reps_anchor > config.max_rep_increase_per_week {
        reps_target = reps_anchor + config.max_rep_increase_per_week;
        flags.clamped_by_max_increase = true;
    }

    let min_reps = config.min_reps(equipment);
    if reps_target < min_reps {
        reps_target = min_reps;
        flags.clamped_by_min_reps = true;
    }

    if let Some(max_intensity) = config.max_intensity.filter(|m| *m > 0.0) {
        let intensity = if e_target > 0.0 {
            weight_user / e_target
        } else {
            0.0
        };
        if intensity > max_intensity {
            flags.too_heavy = true;
        }
    }

    if (config.remove_reps_if_clamped && flags.clamped()) || flags.too_heavy {
        flags.reps_removed_out_of_bounds = true;
        debug!(
            weight_user,
            weight_anchor,
            reps_anchor,
            too_heavy = flags.too_heavy,
            "rep target removed as out of bounds"
        );
        return RepSearch {
            reps_target: None,
            flags,
            e_target,
        };
    }

    RepSearch {
        reps_target: Some(reps_target),
        flags,
        e_target,
    }
}

// ---------------------------------------------------------------------------
/// Series Target
// ---------------------------------------------------------------------------

/// Project the next working set from the previous one.
///
/// `desired_weight = None` is auto mode: previous weight plus the smallest
/// increment, same reps. Otherwise the chosen weight is kept and reps follow
/// from where it falls relative to the normal increment range.
pub fn compute_series_target(
    previous: PreviousSet,
    desired_weight: Option<f64>,
    equipment: Equipment,
    config: &SeriesTargetConfig,
) -> SeriesTarget {
    let profile = config.profile(equipment);

    let prev_weight = config.quantize(previous.weight);
    let prev_reps = previous.reps;
    let auto_weight = config.quantize(prev_weight + profile.step_min);
    let range_high = config.quantize(prev_weight + profile.step_max);

    let Some(desired) = desired_weight else {
        return SeriesTarget {
            weight_target: auto_weight,
            reps_target: Some(prev_reps),
            flags: SeriesTargetFlags {
                auto: true,
                ..Default::default()
            },
        };
    };

    let user_weight = config.quantize(desired);

    // Below the normal increment: earn it with one extra rep instead.
    // Also covers every weight strictly between the previous one and the
    // auto weight, since the lower range bound is the auto weight itself.
    if user_weight >= prev_weight && user_weight < auto_weight {
        return SeriesTarget {
            weight_target: user_weight,
            reps_target: Some(prev_reps + 1),
            flags: SeriesTargetFlags {
                override_used: true,
                same_weight_plus_one_rep: user_weight == prev_weight,
                under_auto_but_not_below_prev_plus_one_rep: true,
                ..Default::default()
            },
        };
    }

    if user_weight >= auto_weight && user_weight <= range_high {
        return SeriesTarget {
            weight_target: user_weight,
            reps_target: Some(prev_reps),
            flags: SeriesTargetFlags {
                override_used: true,
                in_delta_range_keep_reps: true,
                ..Default::default()
            },
        };
    }

    if user_weight > range_high {
        let search = find_reps_for_weight(range_high, prev_reps, user_weight, equipment, config);
        return SeriesTarget {
            weight_target: user_weight,
            reps_target: search.reps_target,
            flags: SeriesTargetFlags {
                override_used: true,
                above_range_e1rm: true,
                ..search.flags
            },
        };
    }

    // Deliberate weight decrease: match one rep harder than last time
    let search = find_reps_for_weight(prev_weight, prev_reps + 1, user_weight, equipment, config);
    SeriesTarget {
        weight_target: user_weight,
        reps_target: search.reps_target,
        flags: SeriesTargetFlags {
            override_used: true,
            below_prev_e1rm: true,
            ..search.flags
        },
    }
}

// ---------------------------------------------------------------------------
/// Next-Session Exercise Targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTargetsInput {
    pub equipment: Equipment,
    pub load_prev: f64,
    pub reps_ref_prev: i32,
    pub sets_prev: i32,
    #[serde(default)]
    pub load_chosen: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTargets {
    pub load_target: f64,
    pub reps_target_hint: i32,
    pub suggestion: Option<String>,
}

fn append_suggestion(existing: Option<String>, next: &str) -> Option<String> {
    match existing {
        Some(text) => Some(format!("{} {}", text, next)),
        None => Some(next.to_string()),
    }
}

/// Load and rep hint for the next occurrence of an exercise.
///
/// The load never moves by less than the equipment's minimum step. Load past
/// the step range costs one rep per overstep unit, and a projected drop in
/// `load x reps x sets` is called out in the suggestion.
pub fn next_exercise_targets(
    input: &ExerciseTargetsInput,
    config: &SeriesTargetConfig,
) -> ExerciseTargets {
    let profile = config.profile(input.equipment);

    let min_target = input.load_prev + profile.step_min;
    let max_target = input.load_prev + profile.step_max;
    let load_target = input.load_chosen.unwrap_or(min_target).max(min_target);

    let mut suggestion = None;
    let reps_target_hint = if load_target > max_target {
        let excess = load_target - max_target;
        let extra_steps = (excess / profile.overstep_unit).ceil() as i32;
        suggestion = append_suggestion(
            suggestion,
            &format!("Load above range: -{} rep(s) target.", extra_steps),
        );
        (input.reps_ref_prev - extra_steps).max(1)
    } else {
        input.reps_ref_prev
    };

    let sets = input.sets_prev as f64;
    let volume_prev = input.load_prev * input.reps_ref_prev as f64 * sets;
    let volume_new = load_target * reps_target_hint as f64 * sets;
    if volume_new < volume_prev {
        suggestion = append_suggestion(
            suggestion,
            "Volume dropping: consider +1 rep on one set or a smaller load increase.",
        );
    }

    ExerciseTargets {
        load_target,
        reps_target_hint,
        suggestion,
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
