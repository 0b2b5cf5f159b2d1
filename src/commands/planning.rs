//! Planning commands: series targets, next-session targets, session close
//! and exercise defaults

use serde::Deserialize;
use tracing::debug;

use super::{decode, encode};
use crate::classification;
use crate::config::EngineConfig;
use crate::mesocycle::{self, MesocycleStructure};
use crate::models::Equipment;
use crate::session::{plan_session, SessionPlanInput};
use crate::targets::{
    compute_series_target, next_exercise_targets, ExerciseTargetsInput, PreviousSet,
};

#[derive(Debug, Deserialize)]
struct SeriesTargetRequest {
    equipment: Equipment,
    previous: PreviousSet,
    #[serde(default)]
    desired_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    equipment: Equipment,
    muscle_group: String,
    current_sets: i32,
}

#[derive(Debug, Deserialize)]
struct RirRequest {
    structure: MesocycleStructure,
    week_index: i32,
    #[serde(default)]
    is_deload: bool,
}

/// Weight and rep target for the next working set
pub fn preview_series_target(
    config: &EngineConfig,
    request_json: &str,
) -> Result<String, String> {
    let request: SeriesTargetRequest = decode(request_json)?;
    let target = compute_series_target(
        request.previous,
        request.desired_weight,
        request.equipment,
        &config.series,
    );
    debug!(
        equipment = %request.equipment,
        weight_target = target.weight_target,
        reps_target = ?target.reps_target,
        "series target computed"
    );
    Ok(encode(&target)?)
}

/// Load and rep hint for the next occurrence of one exercise
pub fn preview_exercise_targets(
    config: &EngineConfig,
    input_json: &str,
) -> Result<String, String> {
    let input: ExerciseTargetsInput = decode(input_json)?;
    Ok(encode(&next_exercise_targets(&input, &config.series))?)
}

/// Feedback records and target writes for a completed session
pub fn plan_session_targets(config: &EngineConfig, input_json: &str) -> Result<String, String> {
    let input: SessionPlanInput = decode(input_json)?;
    let plan = plan_session(&input, &config.series);
    debug!(
        session_id = input.session_id,
        feedback = plan.feedback.len(),
        writes = plan.writes.len(),
        "session planned"
    );
    Ok(encode(&plan)?)
}

/// Default role, joint stress and set bounds for a new exercise
pub fn classify_exercise(request_json: &str) -> Result<String, String> {
    let request: ClassifyRequest = decode(request_json)?;
    let classified = classification::classify_exercise(
        request.equipment,
        &request.muscle_group,
        request.current_sets,
    );
    Ok(encode(&classified)?)
}

/// RIR target for a week of a mesocycle
pub fn rir_target(request_json: &str) -> Result<String, String> {
    let request: RirRequest = decode(request_json)?;
    let rir = mesocycle::rir_target(request.structure, request.week_index, request.is_deload);
    Ok(encode(&rir)?)
}
