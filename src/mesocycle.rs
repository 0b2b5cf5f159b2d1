//! Mesocycle structure and intensity ramp
//!
//! A mesocycle is N hard weeks followed by one deload week. Each week carries
//! a reps-in-reserve (RIR) target that ramps down toward failure and jumps
//! back up for the deload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MesocycleStructure {
    /// 3 hard weeks + deload
    ThreeOne,
    /// 4 hard weeks + deload
    FourOne,
    /// 5 hard weeks + deload
    FiveOne,
}

impl std::fmt::Display for MesocycleStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThreeOne => write!(f, "THREE_ONE"),
            Self::FourOne => write!(f, "FOUR_ONE"),
            Self::FiveOne => write!(f, "FIVE_ONE"),
        }
    }
}

impl std::str::FromStr for MesocycleStructure {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "THREE_ONE" => Ok(Self::ThreeOne),
            "FOUR_ONE" => Ok(Self::FourOne),
            "FIVE_ONE" => Ok(Self::FiveOne),
            _ => Err(format!("Unknown mesocycle structure: {}", s)),
        }
    }
}

const DELOAD_RIR: i32 = 5;

impl MesocycleStructure {
    /// RIR per week, deload last
    pub fn ramp(&self) -> &'static [i32] {
        match self {
            Self::ThreeOne => &[3, 2, 1, DELOAD_RIR],
            Self::FourOne => &[3, 2, 2, 1, DELOAD_RIR],
            Self::FiveOne => &[3, 3, 2, 2, 1, DELOAD_RIR],
        }
    }

    pub fn total_weeks(&self) -> i32 {
        self.ramp().len() as i32
    }

    /// Week indices are 1-based; the final week is the deload
    pub fn week_kind(&self, week_index: i32) -> WeekKind {
        if week_index >= self.total_weeks() {
            WeekKind::Deload
        } else {
            WeekKind::Hard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekKind {
    #[default]
    Hard,
    Deload,
}

impl WeekKind {
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Hard)
    }

    /// Explicit kind wins; otherwise any week not flagged deload is hard
    pub fn resolve(kind: Option<WeekKind>, is_deload: bool) -> WeekKind {
        match kind {
            Some(kind) => kind,
            None if is_deload => WeekKind::Deload,
            None => WeekKind::Hard,
        }
    }
}

/// RIR target for a week; out-of-range indices clamp into the ramp
pub fn rir_target(structure: MesocycleStructure, week_index: i32, is_deload: bool) -> i32 {
    if is_deload {
        return DELOAD_RIR;
    }

    let ramp = structure.ramp();
    let index = week_index.clamp(1, ramp.len() as i32) as usize - 1;
    ramp.get(index).copied().unwrap_or(DELOAD_RIR)
}
