pub mod exercise;
pub mod feedback;
pub mod log;

pub use exercise::{
  CandidateExercise, Equipment, ExerciseRole, ExerciseSet, FutureExercise, PerformedSet,
  SessionSlot,
};
pub use feedback::{FeedbackDelta, MuscleGroupWeeklyEntry, SessionFeedbackRecord};
pub use log::{LogEntity, LogReason, ProgressionLogEntry};
