//! Autoregulation and progression engine for resistance training plans.
//!
//! Weekly subjective feedback drives per-muscle-group set adjustments, and
//! per-exercise performance drives load and rep targets. Every operation is
//! a pure function over a snapshot; the host persists the returned outcome.

pub mod autovolume;
pub mod classification;
pub mod commands;
pub mod config;
pub mod logging;
pub mod mesocycle;
pub mod models;
pub mod selection;
pub mod session;
pub mod strength;
pub mod targets;
pub mod weekclose;

#[cfg(test)]
mod test_utils;

pub use autovolume::{decide_volume, AutoVolumeState, VolumeDecision};
pub use config::{ConfigError, EngineConfig};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use session::{plan_session, SessionPlan, SessionPlanInput};
pub use targets::{compute_series_target, SeriesTarget, SeriesTargetConfig};
pub use weekclose::{close_week, WeekCloseOutcome, WeekSnapshot};
