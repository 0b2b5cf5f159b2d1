//! Default exercise classification
//!
//! New exercises enter auto-volume with a role, a joint stress rating and
//! set bounds derived from their equipment and primary muscle group. Users
//! may override any of these later; the engine only needs sensible defaults.

use serde::{Deserialize, Serialize};

use crate::models::{Equipment, ExerciseRole};

const ISOLATION_GROUPS: &[&str] = &["abs", "addome", "forearms", "avambracci"];

const DUMBBELL_ISOLATION_GROUPS: &[&str] = &[
    "biceps",
    "bicipiti",
    "triceps",
    "tricipiti",
    "calves",
    "polpacci",
    "lateral delts",
    "lateral_delts",
    "deltoidi laterali",
];

const BARBELL_MAIN_GROUPS: &[&str] = &[
    "chest",
    "petto",
    "back",
    "dorso",
    "legs",
    "quadricipiti",
    "quads",
    "femorali",
    "hamstrings",
    "glutes",
    "glutei",
];

const BARBELL_LOWER_AND_BACK_GROUPS: &[&str] = &[
    "legs",
    "quadricipiti",
    "quads",
    "femorali",
    "hamstrings",
    "back",
    "dorso",
    "glutes",
    "glutei",
];

const BARBELL_PRESSING_GROUPS: &[&str] = &["chest", "petto", "shoulders", "spalle"];

/// Trim, lower-case and collapse inner whitespace
fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn in_groups(normalized: &str, groups: &[&str]) -> bool {
    groups.contains(&normalized)
}

pub fn derive_exercise_role(equipment: Equipment, muscle_group: &str) -> ExerciseRole {
    let mg = normalize(muscle_group);

    if in_groups(&mg, ISOLATION_GROUPS) {
        return ExerciseRole::Isolation;
    }
    match equipment {
        Equipment::Dumbbell if in_groups(&mg, DUMBBELL_ISOLATION_GROUPS) => ExerciseRole::Isolation,
        Equipment::Barbell if in_groups(&mg, BARBELL_MAIN_GROUPS) => ExerciseRole::Main,
        _ => ExerciseRole::Secondary,
    }
}

/// Joint stress 1..=5; isolation work never rates above 2
pub fn derive_joint_stress(equipment: Equipment, muscle_group: &str, role: ExerciseRole) -> i32 {
    let mg = normalize(muscle_group);

    let stress = match equipment {
        Equipment::Barbell
            if in_groups(&mg, BARBELL_LOWER_AND_BACK_GROUPS)
                || in_groups(&mg, BARBELL_PRESSING_GROUPS) =>
        {
            4
        }
        Equipment::Barbell => 3,
        Equipment::Machine | Equipment::Dumbbell => 2,
    };

    let stress = if role == ExerciseRole::Isolation {
        stress.min(2)
    } else {
        stress
    };

    stress.clamp(1, 5)
}

/// Role ceiling, never below what is already programmed
pub fn derive_max_sets(role: ExerciseRole, current_sets: i32) -> i32 {
    let base = match role {
        ExerciseRole::Main => 8,
        ExerciseRole::Secondary => 6,
        ExerciseRole::Isolation => 5,
    };
    base.max(current_sets)
}

pub fn derive_min_sets(current_sets: i32) -> i32 {
    current_sets.clamp(1, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseClassification {
    pub exercise_role: ExerciseRole,
    pub joint_stress: i32,
    pub min_sets: i32,
    pub max_sets: i32,
}

pub fn classify_exercise(
    equipment: Equipment,
    muscle_group: &str,
    current_sets: i32,
) -> ExerciseClassification {
    let exercise_role = derive_exercise_role(equipment, muscle_group);
    ExerciseClassification {
        exercise_role,
        joint_stress: derive_joint_stress(equipment, muscle_group, exercise_role),
        min_sets: derive_min_sets(current_sets),
        max_sets: derive_max_sets(exercise_role, current_sets),
    }
}
