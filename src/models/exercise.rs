use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Equipment class of an exercise; selects step ranges and minimum reps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Equipment {
  Dumbbell,
  Barbell,
  Machine,
}

impl std::fmt::Display for Equipment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Dumbbell => write!(f, "DUMBBELL"),
      Self::Barbell => write!(f, "BARBELL"),
      Self::Machine => write!(f, "MACHINE"),
    }
  }
}

impl std::str::FromStr for Equipment {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "DUMBBELL" => Ok(Self::Dumbbell),
      "BARBELL" => Ok(Self::Barbell),
      "MACHINE" => Ok(Self::Machine),
      _ => Err(format!("Unknown equipment: {}", s)),
    }
  }
}

/// Role of an exercise within a muscle group's weekly work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseRole {
  /// Big compound lift
  Main,
  Secondary,
  /// Single-joint accessory work
  Isolation,
}

impl std::fmt::Display for ExerciseRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Main => write!(f, "main"),
      Self::Secondary => write!(f, "secondary"),
      Self::Isolation => write!(f, "isolation"),
    }
  }
}

impl std::str::FromStr for ExerciseRole {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "main" => Ok(Self::Main),
      "secondary" => Ok(Self::Secondary),
      "isolation" => Ok(Self::Isolation),
      _ => Err(format!("Unknown exercise role: {}", s)),
    }
  }
}

/// Position of a session inside its week; identifies "the same session" across weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionSlot {
  pub day_of_week: i32,
  pub order_in_week: i32,
}

impl SessionSlot {
  pub fn new(day_of_week: i32, order_in_week: i32) -> Self {
    Self {
      day_of_week,
      order_in_week,
    }
  }
}

/// An exercise-in-session flagged as eligible for automatic set adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateExercise {
  pub id: i64,
  pub exercise_id: i64,
  pub muscle_group_id: i64,
  pub order_index: i32,
  pub sets_target: i32,
  pub min_sets: i32,
  pub max_sets: i32,
  pub exercise_role: ExerciseRole,
  /// 1 (joint friendly) ..= 5 (very demanding)
  pub joint_stress: i32,
  pub last_adjusted_at: Option<DateTime<Utc>>,
  pub slot: SessionSlot,
}

/// Occurrence of an exercise-in-slot in a later week of the same mesocycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureExercise {
  pub id: i64,
  pub session_id: i64,
  pub week_id: i64,
  pub week_index: i32,
  pub exercise_id: i64,
  pub order_index: i32,
  pub slot: SessionSlot,
  pub sets_target: i32,
  pub load_target: Option<f64>,
  pub reps_target_hint: Option<i32>,
  /// Completed sessions are never rewritten
  #[serde(default)]
  pub completed: bool,
}

impl FutureExercise {
  /// Same exercise in the same position of the same weekly session
  pub fn matches_slot(&self, exercise_id: i64, order_index: i32, slot: SessionSlot) -> bool {
    self.exercise_id == exercise_id && self.order_index == order_index && self.slot == slot
  }
}

/// One logged working set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformedSet {
  pub load_used: Option<f64>,
  pub reps_done: Option<i32>,
}

impl PerformedSet {
  pub fn new(load_used: f64, reps_done: i32) -> Self {
    Self {
      load_used: Some(load_used),
      reps_done: Some(reps_done),
    }
  }
}

/// A performed set attributed to an exercise, used for weekly bests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
  pub exercise_id: i64,
  pub set: PerformedSet,
}
