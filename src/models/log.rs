use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntity {
  Exercise,
  MuscleGroupSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogReason {
  SessionFeedback,
  AutoVolumeDelta,
  AutoVolumePropagation,
  TargetsUpdate,
  TargetsPropagation,
}

impl std::fmt::Display for LogReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::SessionFeedback => write!(f, "session_feedback"),
      Self::AutoVolumeDelta => write!(f, "auto_volume_delta"),
      Self::AutoVolumePropagation => write!(f, "auto_volume_propagation"),
      Self::TargetsUpdate => write!(f, "targets_update"),
      Self::TargetsPropagation => write!(f, "targets_propagation"),
    }
  }
}

/// Audit record of a single mutation the host must persist with the change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionLogEntry {
  pub entity: LogEntity,
  pub entity_id: i64,
  pub week_id: i64,
  pub session_id: Option<i64>,
  pub reason: LogReason,
  pub prev_value: Option<Value>,
  pub new_value: Value,
}
