use serde::{Deserialize, Serialize};

/// Subjective feedback recorded by one completed session for one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeedbackRecord {
  pub session_id: i64,
  pub muscle_group_id: i64,
  /// Sets performed for the muscle group in that session
  pub sets: i32,
  pub fatigue: i32,
  pub doms: i32,
  pub pump: i32,
  pub tendon_pain: i32,
  /// Session performance score 1..=5, when computed
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub perf: Option<i32>,
}

/// Weighted input to weekly aggregation, one per (session, muscle group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleGroupWeeklyEntry {
  pub sets: i32,
  pub fatigue: i32,
  pub doms: i32,
  pub pump: i32,
  pub tendon_pain: i32,
}

impl From<&SessionFeedbackRecord> for MuscleGroupWeeklyEntry {
  fn from(record: &SessionFeedbackRecord) -> Self {
    Self {
      sets: record.sets,
      fatigue: record.fatigue,
      doms: record.doms,
      pump: record.pump,
      tendon_pain: record.tendon_pain,
    }
  }
}

/// Delta shown against every feedback record of the closed week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDelta {
  pub session_id: i64,
  pub muscle_group_id: i64,
  pub delta_sets: i32,
}
